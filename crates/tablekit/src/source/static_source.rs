//! Immutable, in-memory list source.
//!
//! `StaticSource<C>` shows a fixed list of sections built up front, which
//! suits settings screens and other hand-laid-out tables. Each row names the
//! reuse identifier its cell comes from and carries a closure that
//! configures the cell.

use std::fmt;
use std::sync::Arc;

use tablekit_core::logging::targets;

use super::error::{Result, SourceError};
use super::index::{IndexPath, SectionOffset, SectionOffsetting};
use super::traits::{ListHost, SectionedSource};

/// Type alias for a row's cell configuration function.
///
/// Receives the dequeued cell and the row's combined index path.
pub type ConfigureFn<C> = Arc<dyn Fn(&mut C, IndexPath) + Send + Sync>;

/// A single static row.
pub struct Row<C> {
    reuse_identifier: String,
    configure: ConfigureFn<C>,
}

impl<C> Row<C> {
    /// Creates a row that dequeues `reuse_identifier` and runs `configure`.
    pub fn new<F>(reuse_identifier: impl Into<String>, configure: F) -> Self
    where
        F: Fn(&mut C, IndexPath) + Send + Sync + 'static,
    {
        Self {
            reuse_identifier: reuse_identifier.into(),
            configure: Arc::new(configure),
        }
    }

    /// Returns the row's reuse identifier.
    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    /// Runs the row's configuration function against `cell`.
    pub fn configure(&self, cell: &mut C, path: IndexPath) {
        (self.configure)(cell, path);
    }
}

impl<C> Clone for Row<C> {
    fn clone(&self) -> Self {
        Self {
            reuse_identifier: self.reuse_identifier.clone(),
            configure: self.configure.clone(),
        }
    }
}

impl<C> fmt::Debug for Row<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("reuse_identifier", &self.reuse_identifier)
            .finish_non_exhaustive()
    }
}

/// An ordered group of rows with optional header and footer titles.
pub struct Section<C> {
    rows: Vec<Row<C>>,
    header_title: Option<String>,
    footer_title: Option<String>,
}

impl<C> Section<C> {
    /// Creates a section without titles.
    pub fn new(rows: Vec<Row<C>>) -> Self {
        Self {
            rows,
            header_title: None,
            footer_title: None,
        }
    }

    /// Sets the header title.
    pub fn with_header(mut self, title: impl Into<String>) -> Self {
        self.header_title = Some(title.into());
        self
    }

    /// Sets the footer title.
    pub fn with_footer(mut self, title: impl Into<String>) -> Self {
        self.footer_title = Some(title.into());
        self
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row<C>] {
        &self.rows
    }

    /// Returns the header title.
    pub fn header_title(&self) -> Option<&str> {
        self.header_title.as_deref()
    }

    /// Returns the footer title.
    pub fn footer_title(&self) -> Option<&str> {
        self.footer_title.as_deref()
    }
}

impl<C> fmt::Debug for Section<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("rows", &self.rows)
            .field("header_title", &self.header_title)
            .field("footer_title", &self.footer_title)
            .finish()
    }
}

/// A list source over a fixed set of sections.
///
/// # Example
///
/// ```ignore
/// use tablekit::source::{Row, Section, StaticSource};
///
/// let source = StaticSource::new(vec![
///     Section::new(vec![
///         Row::new("toggle", |cell: &mut MyCell, _| cell.set_text("Wi-Fi")),
///         Row::new("detail", |cell: &mut MyCell, _| cell.set_text("Bluetooth")),
///     ])
///     .with_header("Connections"),
/// ]);
///
/// assert_eq!(source.find_row("detail"), Some(IndexPath::new(0, 1)));
/// ```
pub struct StaticSource<C> {
    sections: Vec<Section<C>>,
    offset: SectionOffset,
}

impl<C> StaticSource<C> {
    /// Creates a source whose first section is combined section 0.
    pub fn new(sections: Vec<Section<C>>) -> Self {
        Self::with_offset(sections, SectionOffset::ZERO)
    }

    /// Creates a source whose first section is shown at `offset`.
    pub fn with_offset(sections: Vec<Section<C>>, offset: impl Into<SectionOffset>) -> Self {
        Self {
            sections,
            offset: offset.into(),
        }
    }

    /// Returns the section shown at combined index `section`.
    pub fn section(&self, section: usize) -> Result<&Section<C>> {
        let local = self.offset.to_local(section)?;
        self.sections
            .get(local)
            .ok_or_else(|| SourceError::section_out_of_range(section, self.total_sections()))
    }

    /// Returns the row shown at combined `path`.
    pub fn row(&self, path: IndexPath) -> Result<&Row<C>> {
        let section = self.section(path.section)?;
        section
            .rows
            .get(path.row)
            .ok_or_else(|| SourceError::row_out_of_range(path.section, path.row, section.rows.len()))
    }

    /// Returns the combined path of the first row using `reuse_identifier`.
    ///
    /// Sections are scanned in order, then rows within each section.
    pub fn find_row(&self, reuse_identifier: &str) -> Option<IndexPath> {
        let found = self.sections.iter().enumerate().find_map(|(section, rows)| {
            rows.rows
                .iter()
                .position(|row| row.reuse_identifier == reuse_identifier)
                .map(|row| self.offset_path(IndexPath::new(section, row)))
        });
        if found.is_none() {
            tracing::debug!(target: targets::SOURCE, reuse_identifier, "no static row uses identifier");
        }
        found
    }

    fn total_sections(&self) -> usize {
        self.offset.to_combined(self.sections.len())
    }
}

impl<C> SectionOffsetting for StaticSource<C> {
    fn section_offset(&self) -> SectionOffset {
        self.offset
    }
}

impl<C> fmt::Debug for StaticSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSource")
            .field("sections", &self.sections)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<H: ListHost> SectionedSource<H> for StaticSource<H::Cell> {
    fn section_count(&self) -> usize {
        self.total_sections()
    }

    fn row_count(&self, section: usize) -> Result<usize> {
        Ok(self.section(section)?.rows.len())
    }

    fn cell(&self, host: &H, path: IndexPath) -> Result<H::Cell> {
        let row = self.row(path)?;
        let mut cell = host.dequeue_reusable_cell(&row.reuse_identifier, path);
        row.configure(&mut cell, path);
        Ok(cell)
    }

    fn header_title(&self, section: usize) -> Result<Option<String>> {
        Ok(self.section(section)?.header_title.clone())
    }

    fn footer_title(&self, section: usize) -> Result<Option<String>> {
        Ok(self.section(section)?.footer_title.clone())
    }

    fn can_edit(&self, _path: IndexPath) -> bool {
        false
    }
}
