//! Error types for list sources.

use super::results::StoreError;

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while querying or updating a list source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// A section or row index outside the source's current bounds.
    #[error("{} out of range (bound {bound})", describe(.section, .row))]
    OutOfRange {
        section: usize,
        row: Option<usize>,
        bound: usize,
    },

    /// The backing store could not satisfy a reload.
    #[error("Query failed: {0}")]
    QueryFailure(#[from] StoreError),

    /// A composite was asked for a tail section with no override registered.
    #[error("No override registered for tail section {section}")]
    MisconfiguredComposite { section: usize },

    /// A change event arrived that violates batch bracketing.
    #[error("Invalid change batch: {0}")]
    InvalidBatch(&'static str),

    /// The source does not support committing edits.
    #[error("Editing not supported at section {section}, row {row}")]
    EditNotSupported { section: usize, row: usize },
}

fn describe(section: &usize, row: &Option<usize>) -> String {
    match row {
        Some(row) => format!("Row {row} in section {section}"),
        None => format!("Section {section}"),
    }
}

impl SourceError {
    /// Create an out-of-range error for a section index.
    pub fn section_out_of_range(section: usize, bound: usize) -> Self {
        Self::OutOfRange {
            section,
            row: None,
            bound,
        }
    }

    /// Create an out-of-range error for a row within a section.
    pub fn row_out_of_range(section: usize, row: usize, bound: usize) -> Self {
        Self::OutOfRange {
            section,
            row: Some(row),
            bound,
        }
    }

    /// Returns `true` for caller errors about bad coordinates.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
