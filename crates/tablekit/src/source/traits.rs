//! Core traits for list sources and the hosts that display them.
//!
//! A [`ListHost`] is the rendering side: it owns a pool of reusable cells and
//! accepts structural mutations. A [`SectionedSource`] is the data side: it
//! answers the host's count and cell queries. Every source in this crate,
//! including composites, implements the same contract so they nest freely.

use serde::{Deserialize, Serialize};

use super::error::{Result, SourceError};
use super::index::IndexPath;

/// How a structural change should be animated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAnimation {
    /// Cross-fade the affected rows.
    #[default]
    Fade,
    /// Slide rows in or out from the right.
    Right,
    /// Slide rows in or out from the left.
    Left,
    /// Slide rows in from above or out upwards.
    Top,
    /// Slide rows in from below or out downwards.
    Bottom,
    /// No animation.
    None,
}

/// A structural change applied to a host, always in combined coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListMutation {
    /// Insert a section at the given index.
    InsertSection(usize, RowAnimation),
    /// Delete the section at the given index.
    DeleteSection(usize, RowAnimation),
    /// Insert a row at the given path.
    InsertRow(IndexPath, RowAnimation),
    /// Delete the row at the given path.
    DeleteRow(IndexPath, RowAnimation),
}

/// The rendering host a source feeds.
///
/// Hosts are driven from a single thread (the one owning the view). Sources
/// never hold internal locks while calling into a host, so hosts may query
/// the source back from any of these methods.
pub trait ListHost: Send + Sync {
    /// The cell type the host renders. Usually a cheap handle to a view.
    type Cell;

    /// Obtains a cell from the reuse pool for the given identifier.
    fn dequeue_reusable_cell(&self, reuse_identifier: &str, path: IndexPath) -> Self::Cell;

    /// Runs `update` on the cell currently on screen at `path`.
    ///
    /// The update must land on the displayed cell itself, not on a copy.
    /// Returns `false`, without calling `update`, when no cell is visible
    /// there.
    fn with_visible_cell(&self, path: IndexPath, update: &mut dyn FnMut(&mut Self::Cell)) -> bool;

    /// Opens a batched-update transaction.
    fn begin_updates(&self);

    /// Applies one structural mutation inside the open transaction.
    fn apply(&self, mutation: ListMutation);

    /// Closes the batched-update transaction.
    fn end_updates(&self);

    /// Discards all state and re-queries the source from scratch.
    fn reload_data(&self);
}

/// The kind of edit a host asks a source to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Delete the row.
    Delete,
    /// Insert a new row at the position.
    Insert,
}

/// Optional features a source supports.
///
/// Hosts consult these flags instead of probing for optional methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceCapabilities {
    /// The source provides section index titles.
    pub section_index: bool,
    /// The source can commit edits.
    pub editing: bool,
}

impl SourceCapabilities {
    /// Creates capabilities with every feature off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the section index flag.
    pub fn with_section_index(mut self, enabled: bool) -> Self {
        self.section_index = enabled;
        self
    }

    /// Sets the editing flag.
    pub fn with_editing(mut self, enabled: bool) -> Self {
        self.editing = enabled;
        self
    }
}

/// The provider contract every list source implements.
///
/// # Implementation Requirements
///
/// At minimum, implement [`row_count`](SectionedSource::row_count) and
/// [`cell`](SectionedSource::cell). For every section `s` a source
/// reports, `cell` must succeed for each row below `row_count(s)`.
///
/// Sections and paths passed in are always combined coordinates.
pub trait SectionedSource<H: ListHost>: Send + Sync {
    /// Returns the number of sections. Sources without sections report 1.
    fn section_count(&self) -> usize {
        1
    }

    /// Returns the number of rows in `section`.
    fn row_count(&self, section: usize) -> Result<usize>;

    /// Produces a configured cell for the row at `path`.
    fn cell(&self, host: &H, path: IndexPath) -> Result<H::Cell>;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns the header title of `section`.
    fn header_title(&self, _section: usize) -> Result<Option<String>> {
        Ok(None)
    }

    /// Returns the footer title of `section`.
    fn footer_title(&self, _section: usize) -> Result<Option<String>> {
        Ok(None)
    }

    /// Returns `true` if the row at `path` may be edited.
    fn can_edit(&self, _path: IndexPath) -> bool {
        false
    }

    /// Commits an edit of the row at `path`.
    ///
    /// The default rejects every edit.
    fn commit_edit(&self, _kind: EditKind, path: IndexPath) -> Result<()> {
        Err(SourceError::EditNotSupported {
            section: path.section,
            row: path.row,
        })
    }

    /// Returns the optional features this source supports.
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::new()
    }

    /// Returns the section index titles, when supported.
    fn section_index_titles(&self) -> Option<Vec<String>> {
        None
    }

    /// Returns the section that a section index title jumps to.
    ///
    /// `at` is the position of `title` in
    /// [`section_index_titles`](SectionedSource::section_index_titles).
    /// Returns `None` when unsupported or the title is unknown.
    fn section_for_index_title(&self, _title: &str, _at: usize) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHost;

    impl ListHost for NullHost {
        type Cell = ();
        fn dequeue_reusable_cell(&self, _: &str, _: IndexPath) {}
        fn with_visible_cell(&self, _: IndexPath, _: &mut dyn FnMut(&mut ())) -> bool {
            false
        }
        fn begin_updates(&self) {}
        fn apply(&self, _: ListMutation) {}
        fn end_updates(&self) {}
        fn reload_data(&self) {}
    }

    struct Flat(usize);

    impl SectionedSource<NullHost> for Flat {
        fn row_count(&self, _section: usize) -> Result<usize> {
            Ok(self.0)
        }

        fn cell(&self, host: &NullHost, path: IndexPath) -> Result<()> {
            host.dequeue_reusable_cell("flat", path);
            Ok(())
        }
    }

    #[test]
    fn test_defaults() {
        let source = Flat(3);
        let path = IndexPath::new(0, 1);
        assert_eq!(source.section_count(), 1);
        assert_eq!(source.header_title(0), Ok(None));
        assert_eq!(source.footer_title(0), Ok(None));
        assert!(!source.can_edit(path));
        assert_eq!(
            source.commit_edit(EditKind::Delete, path),
            Err(SourceError::EditNotSupported { section: 0, row: 1 })
        );
        assert_eq!(source.capabilities(), SourceCapabilities::new());
        assert!(source.section_index_titles().is_none());
        assert!(source.section_for_index_title("A", 0).is_none());
    }

    #[test]
    fn test_capability_builders() {
        let caps = SourceCapabilities::new().with_section_index(true);
        assert!(caps.section_index);
        assert!(!caps.editing);
        assert!(caps.with_editing(true).editing);
    }
}
