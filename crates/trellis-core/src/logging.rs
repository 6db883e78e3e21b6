//! Logging and debugging facilities for Trellis.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Shared formatting options for hierarchy dumps
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("trellis::model=trace")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout Trellis for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Structural transaction span (begin/end pairs).
    pub const TRANSACTION: &str = "trellis::transaction";
    /// Persistent index remapping span.
    pub const REMAP: &str = "trellis::remap";
    /// Observer notification span.
    pub const NOTIFY: &str = "trellis::notify";
    /// Signal emission span.
    pub const SIGNAL: &str = "trellis::signal";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "trellis_core";
    /// Signal system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Observer registry target.
    pub const OBSERVER: &str = "trellis_core::observer";
    /// Model shell and transaction target.
    pub const MODEL: &str = "trellis::model";
    /// Persistent index registry target.
    pub const PERSISTENT: &str = "trellis::model::persistent";
    /// Reference data sources target.
    pub const DATA_SOURCE: &str = "trellis::model::source";
}

/// Style options for hierarchy visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for hierarchy debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show `(row, column)` positions.
    pub show_positions: bool,
    /// Whether to show internal ids.
    pub show_ids: bool,
    /// Whether to mark items tracked by a persistent handle.
    pub show_persistent: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_positions: true,
            show_ids: false,
            show_persistent: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            show_persistent: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_positions: false,
            show_ids: false,
            show_persistent: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a node at the given depth.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with a consistent
/// target.
#[macro_export]
macro_rules! trellis_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! trellis_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_root_is_empty() {
        let options = TreeFormatOptions::default();
        assert_eq!(options.prefix(0, true), "");
    }

    #[test]
    fn test_prefix_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.prefix(1, false), "+-- ");
        assert_eq!(options.prefix(1, true), "`-- ");
        assert_eq!(options.prefix(2, true), "|  `-- ");
    }

    #[test]
    fn test_minimal_options() {
        let options = TreeFormatOptions::minimal();
        assert!(!options.show_positions);
        assert!(!options.show_ids);
        assert!(!options.show_persistent);
    }

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic
        let _span = PerfSpan::new("test_operation");
    }
}
