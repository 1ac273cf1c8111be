//! List sources: the data side of sectioned list views.
//!
//! A list view asks its source how many sections and rows there are and
//! for a configured cell per row. This module provides composable sources
//! that answer those queries:
//!
//! - `StaticSource`: a fixed list of sections and rows built up front
//! - `LiveSource`: the results of a store query, kept in sync with the
//!   store's change batches
//! - `CompositeSource`: routes each section to a root source or a
//!   per-section override, so several sources appear as one list
//!
//! # Core Types
//!
//! - `IndexPath`: a section and row
//! - `SectionOffset`: shifts a source's sections into a combined list
//! - `SectionedSource`: the trait every source implements
//! - `ListHost`: the trait the rendering side implements
//! - `ListMutation`: a structural change applied to a host
//!
//! # Combining Sources
//!
//! ```text
//!               ┌──────────────────┐
//!   host ──────>│ CompositeSource  │
//!               └──────────────────┘
//!                 │ section 0   │ sections 1..
//!                 v             v
//!        ┌──────────────┐  ┌──────────────┐      ┌──────────────┐
//!        │ StaticSource │  │  LiveSource  │<─────│ ResultsStore │
//!        └──────────────┘  │  (offset 1)  │ batch└──────────────┘
//!                          └──────────────┘
//! ```
//!
//! Sections and paths crossing the host boundary are always combined
//! coordinates. Each offset source converts to its own local coordinates
//! with [`SectionOffsetting`].

mod composite;
mod config;
mod error;
mod index;
mod live_source;
mod results;
mod static_source;
mod traits;

pub use composite::{CompositeSource, HeaderPolicy, SharedSource};
pub use config::{ConfigError, DEFAULT_REUSE_IDENTIFIER, LiveSourceConfig};
pub use error::{Result, SourceError};
pub use index::{IndexPath, SectionOffset, SectionOffsetting};
pub use live_source::{ConfigureElementFn, LiveSource, LiveSourceBuilder, LiveSourceSignals, translate};
pub use results::{
    ChangeEvent, FetchRequest, ResultSection, ResultSnapshot, ResultsStore, SortDescriptor,
    StoreError,
};
pub use static_source::{ConfigureFn, Row, Section, StaticSource};
pub use traits::{
    EditKind, ListHost, ListMutation, RowAnimation, SectionedSource, SourceCapabilities,
};
