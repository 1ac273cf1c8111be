//! Prelude module for tablekit.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use tablekit::prelude::*;
//! ```

// ============================================================================
// Signals
// ============================================================================

pub use crate::signal::{ConnectionGuard, ConnectionId, Signal};

// ============================================================================
// Sources
// ============================================================================

pub use crate::source::{
    CompositeSource, HeaderPolicy, LiveSource, LiveSourceBuilder, LiveSourceConfig, Row, Section,
    SharedSource, StaticSource,
};

// ============================================================================
// Contracts and Coordinates
// ============================================================================

pub use crate::source::{
    ChangeEvent, EditKind, FetchRequest, IndexPath, ListHost, ListMutation, ResultSnapshot,
    ResultsStore, RowAnimation, SectionOffset, SectionOffsetting, SectionedSource,
    SortDescriptor, SourceError,
};
