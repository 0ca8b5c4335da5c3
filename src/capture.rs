use crate::trace::{CallType, RawFrame};
use log::debug;

/// Source of the current call stack.
pub trait StackCapture: Send + Sync {
    /// Capture the stack of the calling thread, the immediate caller of `capture` first.
    fn capture(&self) -> Vec<RawFrame>;
}

/// [`StackCapture`] implementation based on native unwinding and debug information.
///
/// Native frames carry no argument values, so captured frames always have empty `args`.
#[derive(Default, Debug, Clone, Copy)]
pub struct BacktraceCapture;

impl BacktraceCapture {
    /// Owner of the `capture` symbol as it reads after demangling.
    const OWN_FRAME_OWNER: &'static str = concat!(
        "<",
        module_path!(),
        "::BacktraceCapture as ",
        module_path!(),
        "::StackCapture>"
    );

    /// Number of leading frames that belong to the unwinder and to `capture` itself.
    fn own_frames_end(frames: &[RawFrame]) -> usize {
        frames
            .iter()
            .rposition(|f| f.class == Self::OWN_FRAME_OWNER)
            .map(|pos| pos + 1)
            .unwrap_or(0)
    }
}

impl StackCapture for BacktraceCapture {
    #[inline(never)]
    fn capture(&self) -> Vec<RawFrame> {
        let bt = backtrace::Backtrace::new();

        let frames: Vec<RawFrame> = bt
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .map(|symbol| {
                let name = symbol
                    .name()
                    .map(|name| match name.as_str() {
                        Some(raw) => format!("{:#}", rustc_demangle::demangle(raw)),
                        None => format!("{name:#}"),
                    })
                    .unwrap_or_default();

                let mut frame = symbol_frame(&name);
                frame.file = symbol
                    .filename()
                    .map(|path| path.to_string_lossy().into_owned());
                frame.line = symbol.lineno();
                frame
            })
            .collect();

        let start = Self::own_frames_end(&frames);

        debug!(target: "capture", "captured {} frames, {start} skipped", frames.len());

        frames.into_iter().skip(start).collect()
    }
}

/// Split a demangled symbol like `app::Router::redirect` into owner path and function name.
///
/// `::` inside generic arguments (`<T as a::Trait>::f`) is not a separator.
fn symbol_frame(symbol: &str) -> RawFrame {
    let bytes = symbol.as_bytes();
    let mut depth = 0usize;
    let mut split = None;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    match split {
        Some(pos) => RawFrame::new(&symbol[pos + 2..]).with_owner(&symbol[..pos], CallType::Static),
        None => RawFrame::new(symbol),
    }
}
