//! Logging utilities with colored module prefixes.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only printed when `--verbose` is set
//! - `access` for one-line request logs
//!
//! # Example
//!
//! ```ignore
//! log!("serve"; "http://{}", addr);
//! debug!("etag"; "hashed {} files", count);
//! ```

use owo_colors::{OwoColorize, Stream, Style};
use std::{
    fmt,
    io::{Write, stderr, stdout},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Errors go to stderr, everything else to stdout.
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    if module_lower == "error" {
        let mut out = stderr().lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    } else {
        let mut out = stdout().lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    }
}

/// Log a finished request: `[access] 10.0.0.1 GET /index.html 200 1.2ms`
pub fn access(client: &str, method: &str, path: &str, status: u16, latency: Duration) {
    let status = colorize_status(status);
    log("access", &format!("{client} {method} {path} {status} {latency:.1?}"));
}

/// Render `value` in `style` if `stream` supports colors.
///
/// Honours the `--color` override set in `main`.
pub fn paint<T: fmt::Display>(value: T, stream: Stream, style: Style) -> String {
    value.if_supports_color(stream, |v| v.style(style)).to_string()
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    let (stream, style) = match module_lower {
        "serve" => (Stream::Stdout, Style::new().bright_blue().bold()),
        "access" => (Stream::Stdout, Style::new().dimmed()),
        "etag" => (Stream::Stdout, Style::new().bright_green().bold()),
        "error" => (Stream::Stderr, Style::new().bright_red().bold()),
        _ => (Stream::Stdout, Style::new().bright_yellow().bold()),
    };
    paint(prefix, stream, style)
}

fn colorize_status(status: u16) -> String {
    let style = match status {
        200..=299 => Style::new().green(),
        300..=399 => Style::new().cyan(),
        400..=499 => Style::new().yellow(),
        _ => Style::new().red(),
    };
    paint(status, Stream::Stdout, style)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_prefix_contains_module_name() {
        owo_colors::set_override(false);
        assert_eq!(colorize_prefix("serve", "serve"), "[serve]");
        assert_eq!(colorize_prefix("Etag", "etag"), "[Etag]");
    }

    #[test]
    fn test_paint_respects_color_override() {
        owo_colors::set_override(false);
        let style = Style::new().bright_blue().bold();
        assert_eq!(paint("[serve]", Stream::Stdout, style), "[serve]");
        assert_eq!(paint(404, Stream::Stderr, style), "404");
    }

    #[test]
    fn test_status_text_preserved() {
        owo_colors::set_override(false);
        assert_eq!(colorize_status(304), "304");
        assert_eq!(colorize_status(500), "500");
    }
}
