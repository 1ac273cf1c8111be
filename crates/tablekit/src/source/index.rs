//! Index paths and section offsetting.
//!
//! An [`IndexPath`] addresses a row within a sectioned list. A source that
//! occupies the tail of a combined list carries a [`SectionOffset`]: its
//! local section `n` is shown as combined section `n + offset`. Sources
//! expose their offset through [`SectionOffsetting`], which provides the
//! path translations for free.

use std::fmt;

use super::error::{Result, SourceError};

/// The position of a row within a sectioned list.
///
/// Index paths are plain values; whether one is local to a source or
/// combined depends on who produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// The section containing the row.
    pub section: usize,
    /// The row within the section.
    pub row: usize,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, row): (usize, usize)) -> Self {
        Self::new(section, row)
    }
}

/// A constant shift between a source's local sections and the combined list.
///
/// `combined = local + offset`. The mapping is strictly monotonic and
/// never yields a negative local section: asking for a combined section
/// below the offset is an [`SourceError::OutOfRange`] error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SectionOffset(usize);

impl SectionOffset {
    /// No shift: local and combined sections coincide.
    pub const ZERO: Self = Self(0);

    /// Creates an offset.
    #[inline]
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Returns the number of sections the source is shifted by.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Maps a combined section to a local one.
    #[inline]
    pub fn to_local(self, combined: usize) -> Result<usize> {
        combined
            .checked_sub(self.0)
            .ok_or_else(|| SourceError::section_out_of_range(combined, self.0))
    }

    /// Maps a local section to a combined one.
    #[inline]
    pub const fn to_combined(self, local: usize) -> usize {
        local + self.0
    }

    /// Maps a combined path to a local one, keeping the row.
    pub fn to_local_path(self, combined: IndexPath) -> Result<IndexPath> {
        Ok(IndexPath::new(self.to_local(combined.section)?, combined.row))
    }

    /// Maps a local path to a combined one, keeping the row.
    pub const fn to_combined_path(self, local: IndexPath) -> IndexPath {
        IndexPath::new(self.to_combined(local.section), local.row)
    }
}

impl From<usize> for SectionOffset {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

/// Implemented by sources that live at a fixed offset in a combined list.
pub trait SectionOffsetting {
    /// Returns the source's section offset.
    fn section_offset(&self) -> SectionOffset;

    /// Maps a combined path into the source's local coordinates.
    fn inset_path(&self, path: IndexPath) -> Result<IndexPath> {
        self.section_offset().to_local_path(path)
    }

    /// Maps a local path into combined coordinates.
    fn offset_path(&self, path: IndexPath) -> IndexPath {
        self.section_offset().to_combined_path(path)
    }
}
