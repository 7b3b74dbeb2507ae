//! Logging facilities for Tessera.
//!
//! Tessera uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "tessera_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "tessera_core::signal";
    /// Headless document target (tree edits, hover, event dispatch).
    pub const DOM: &str = "tessera_core::dom";
    /// Mutation observer target.
    pub const OBSERVER: &str = "tessera_core::observer";
}

/// A guard that keeps a `perf` span entered until dropped.
///
/// ```
/// use tessera_core::logging::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("style_construction");
///     // measured work
/// }
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "tessera::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
