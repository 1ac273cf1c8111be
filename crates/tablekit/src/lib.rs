//! tablekit - composable data sources for sectioned list views.
//!
//! This is the main crate. It re-exports the core systems from
//! `tablekit-core` and provides the list sources in [`source`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tablekit::prelude::*;
//!
//! let settings = StaticSource::new(vec![
//!     Section::new(vec![Row::new("account", |cell: &mut MyCell, _| cell.set_text("Account"))]),
//! ]);
//!
//! let notes = LiveSourceBuilder::new(store, host.clone())
//!     .section_offset(1)
//!     .configure(|cell: &mut MyCell, note: &Note| cell.set_text(&note.title))
//!     .build();
//! notes.reload()?;
//!
//! let composite = CompositeSource::new(Arc::new(settings));
//! composite.set_override(1, notes);
//! ```

pub use tablekit_core::*;

pub mod prelude;
pub mod source;
