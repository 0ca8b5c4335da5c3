use std::borrow::Cow;

/// Shortener for source file paths shown in a trace.
///
/// Strips the deployment root and, if the rest is still too long, keeps only its tail,
/// since file name and closest directories are the interesting part of a path.
#[derive(Clone, Debug)]
pub struct PathSanitizer {
    root_prefix: String,
    max_len: usize,
    tail_len: usize,
}

impl PathSanitizer {
    /// String prepended to a path if it was shortened.
    pub const STUB: &'static str = "...";

    /// Create new sanitizer.
    ///
    /// # Arguments
    ///
    /// * `root_prefix`: prefix removed from the start of a path, empty string disables stripping
    /// * `max_len`: maximum length (in characters) of a path left as is
    /// * `tail_len`: number of trailing characters kept when a path is shortened
    pub fn new(root_prefix: impl Into<String>, max_len: usize, tail_len: usize) -> Self {
        Self {
            root_prefix: root_prefix.into(),
            max_len,
            tail_len,
        }
    }

    pub fn apply<'b>(&self, path: &'b str) -> Cow<'b, str> {
        let path = match self.root_prefix.as_str() {
            "" => path,
            prefix => path.strip_prefix(prefix).unwrap_or(path),
        };

        let len = path.chars().count();
        if len <= self.max_len {
            return Cow::Borrowed(path);
        }

        let tail_start = path
            .char_indices()
            .nth(len.saturating_sub(self.tail_len))
            .map(|(idx, _)| idx)
            .unwrap_or(path.len());

        Cow::Owned(format!("{}{}", Self::STUB, &path[tail_start..]))
    }
}
