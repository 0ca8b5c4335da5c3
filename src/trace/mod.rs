//! Call stack rendering for the redirect diagnostic page.
//!
//! A captured stack is a list of [`RawFrame`], nearest to the capture point first.
//! [`TraceFormatter`] turns it into numbered display lines, each one with a source location
//! and a call signature.

mod args;
pub mod path;

pub use args::ArgValue;

use crate::config::TraceConfig;
use itertools::Itertools;
use path::PathSanitizer;
use std::fmt;
use strum_macros::IntoStaticStr;

/// How a function was called, rendered between owner type and function name.
#[derive(Copy, Clone, PartialEq, Eq, Debug, IntoStaticStr)]
pub enum CallType {
    #[strum(serialize = "->")]
    Instance,
    #[strum(serialize = "::")]
    Static,
}

/// Single stack level as it was captured.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: String,
    pub class: String,
    pub call_type: Option<CallType>,
    pub args: Vec<ArgValue>,
}

impl RawFrame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_owner(mut self, class: impl Into<String>, call_type: CallType) -> Self {
        self.class = class.into();
        self.call_type = Some(call_type);
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = ArgValue>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Source line, zero is treated as unknown.
    pub fn line(&self) -> Option<u32> {
        self.line.filter(|&line| line > 0)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref().filter(|file| !file.is_empty())
    }

    /// Function name as it reads at a call site, e.g. `Foo->bar`, `Foo::bar` or `bar`.
    pub fn qualified_name(&self) -> String {
        let call_type: &'static str = self.call_type.map(Into::into).unwrap_or_default();
        format!("{}{call_type}{}", self.class, self.function)
    }
}

/// Index of the first frame at or after `idx` that knows its source line.
///
/// Frames of builtin or native calls carry no line, the nearest caller that has one
/// gives the place where the call happened.
pub fn location_source(frames: &[RawFrame], idx: usize) -> Option<usize> {
    (idx..frames.len()).find(|&i| frames[i].line().is_some())
}

/// Display-ready trace line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedFrame {
    /// 1-based sequence number, zero padded to at least two digits.
    pub label: String,
    /// Sanitized `file:line`.
    pub location: String,
    /// Qualified function name with argument summary, e.g. `Foo->bar("x",42)`.
    pub call: String,
}

impl fmt::Display for FormattedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<span style="font-style: italic; opacity: 0.7;">{}</span> {}"#,
            self.location, self.call
        )
    }
}

/// Stateless renderer of captured stacks.
#[derive(Clone, Debug)]
pub struct TraceFormatter {
    skip_frames: usize,
    sanitizer: PathSanitizer,
}

impl Default for TraceFormatter {
    fn default() -> Self {
        Self::new(&TraceConfig::default())
    }
}

impl TraceFormatter {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            skip_frames: config.skip_frames,
            sanitizer: PathSanitizer::new(
                config.root_prefix.as_str(),
                config.max_path_len,
                config.path_tail_len,
            ),
        }
    }

    /// Render frames in capture order.
    ///
    /// Leading `skip_frames` frames are dropped when the stack is deeper than that.
    /// The first rendered frame never shows arguments, they belong to the redirect call
    /// itself rather than to application code.
    pub fn format(&self, frames: &[RawFrame]) -> Vec<FormattedFrame> {
        let start_at = if frames.len() > self.skip_frames {
            self.skip_frames
        } else {
            0
        };

        (start_at..frames.len())
            .enumerate()
            .map(|(num, idx)| {
                let frame = &frames[idx];

                let (file, line) = match location_source(frames, idx) {
                    Some(src) => (
                        frames[src].file().unwrap_or_default(),
                        frames[src].line().map(|l| l.to_string()).unwrap_or_default(),
                    ),
                    None => ("", String::new()),
                };

                let args = if num == 0 {
                    String::new()
                } else {
                    frame.args.iter().map(ArgValue::summary).join(",")
                };

                FormattedFrame {
                    label: format!("{:02}", num + 1),
                    location: format!("{}:{line}", self.sanitizer.apply(file)),
                    call: format!("{}({args})", frame.qualified_name()),
                }
            })
            .collect()
    }
}
