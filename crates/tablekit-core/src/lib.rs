//! Core systems for tablekit.
//!
//! This crate provides the pieces the list sources are built on:
//!
//! - **Signals**: typed, multi-slot change notification ([`Signal`])
//! - **Logging**: `tracing` targets and performance spans ([`logging`])
//!
//! # Signal Example
//!
//! ```
//! use tablekit_core::Signal;
//!
//! let reloaded = Signal::<usize>::new();
//! let conn_id = reloaded.connect(|sections| {
//!     println!("reloaded with {sections} sections");
//! });
//!
//! reloaded.emit(3);
//! reloaded.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
