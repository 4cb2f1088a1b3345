//! Config field paths used in diagnostics.

use crate::logger::paint;
use owo_colors::{Stream, Style};
use std::fmt;

/// Dotted path of a config field, e.g. `serve.port`.
///
/// Sections expose their fields as associated constants:
///
/// ```ignore
/// diag.error(ServeConfig::PORT, "port required");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            paint(format!("`{}`", self.0), Stream::Stderr, Style::new().bright_blue())
        )
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
