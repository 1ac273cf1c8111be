//! Logging facilities for tablekit.
//!
//! tablekit uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("tablekit=debug")
//!     .init();
//! ```
//!
//! All events are emitted under the targets in [`targets`], so they can be
//! filtered per subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal dispatch.
    pub const SIGNAL: &str = "tablekit_core::signal";
    /// Static and shared source plumbing.
    pub const SOURCE: &str = "tablekit::source";
    /// Live (store-backed) sources: reloads and change batches.
    pub const LIVE: &str = "tablekit::source::live";
    /// Composite routing.
    pub const COMPOSITE: &str = "tablekit::source::composite";
    /// Performance spans.
    pub const PERF: &str = "tablekit::perf";
}

/// A guard that keeps a performance span entered until dropped.
///
/// ```
/// use tablekit_core::logging::PerfSpan;
///
/// fn reload() {
///     let _span = PerfSpan::new("reload");
///     // work measured here
/// }
/// # reload();
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
