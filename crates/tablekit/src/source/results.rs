//! The backing-store side of live sources.
//!
//! A [`ResultsStore`] executes a [`FetchRequest`] and hands back a
//! [`ResultSnapshot`]: the matching elements grouped into named sections.
//! While results are live, the store pushes [`ChangeEvent`]s through its
//! change signal. Every batch is bracketed by `BeginBatch` and `EndBatch`,
//! and the end marker carries the confirmed snapshot after the batch.

use std::sync::Arc;

use tablekit_core::Signal;

use super::index::IndexPath;

/// An error reported by a store that could not execute a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    /// Create a store error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Sort order for one key of a fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortDescriptor {
    /// The key path sorted on.
    pub key: String,
    /// `true` for ascending order.
    pub ascending: bool,
}

impl SortDescriptor {
    /// Ascending order on `key`.
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ascending: true,
        }
    }

    /// Descending order on `key`.
    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ascending: false,
        }
    }
}

/// Describes the results a live source shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// The store entity to query. Inferred from the element type when unset.
    pub entity: Option<String>,
    /// Sort order, most significant first.
    pub sort: Vec<SortDescriptor>,
    /// Key path whose value groups elements into sections.
    pub section_key_path: Option<String>,
    /// Opaque cache name passed through to the store.
    pub cache_name: Option<String>,
}

impl FetchRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Appends a sort descriptor.
    pub fn sorted_by(mut self, descriptor: SortDescriptor) -> Self {
        self.sort.push(descriptor);
        self
    }
}

/// One named group of a result snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSection<E> {
    /// The group's name, shown as the section header.
    pub name: String,
    /// The group's entry in the section index, if any.
    pub index_title: Option<String>,
    /// The group's elements, in order.
    pub elements: Vec<E>,
}

impl<E> ResultSection<E> {
    /// Creates a section; the index title defaults to the name's first character.
    pub fn new(name: impl Into<String>, elements: Vec<E>) -> Self {
        let name = name.into();
        let index_title = name.chars().next().map(|c| c.to_uppercase().collect::<String>());
        Self {
            name,
            index_title,
            elements,
        }
    }
}

/// The results of a fetch, grouped into sections. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSnapshot<E> {
    sections: Vec<ResultSection<E>>,
}

impl<E> Default for ResultSnapshot<E> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

impl<E> ResultSnapshot<E> {
    /// Creates a snapshot from its sections.
    pub fn new(sections: Vec<ResultSection<E>>) -> Self {
        Self { sections }
    }

    /// Creates a single unnamed section holding `elements`.
    pub fn ungrouped(elements: Vec<E>) -> Self {
        Self::new(vec![ResultSection {
            name: String::new(),
            index_title: None,
            elements,
        }])
    }

    /// Returns the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Returns the number of elements in `section`.
    pub fn row_count(&self, section: usize) -> Option<usize> {
        self.sections.get(section).map(|s| s.elements.len())
    }

    /// Returns the section at `section`.
    pub fn section(&self, section: usize) -> Option<&ResultSection<E>> {
        self.sections.get(section)
    }

    /// Returns the element at a local path.
    pub fn element(&self, path: IndexPath) -> Option<&E> {
        self.sections.get(path.section)?.elements.get(path.row)
    }

    /// Returns the `n`th element, ignoring section boundaries.
    pub fn element_at(&self, n: usize) -> Option<&E> {
        self.iter().nth(n)
    }

    /// Iterates every element in section-then-row order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.sections.iter().flat_map(|s| s.elements.iter())
    }

    /// Returns the total number of elements.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.elements.len()).sum()
    }

    /// Returns `true` if the snapshot holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the index titles of every section that has one.
    pub fn section_index_titles(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter_map(|s| s.index_title.clone())
            .collect()
    }

    /// Returns the section that index title `title` jumps to.
    ///
    /// `at` is the title's position in [`section_index_titles`]; when several
    /// sections share a title it picks the matching one. Returns `None` when
    /// no section carries `title`.
    ///
    /// [`section_index_titles`]: Self::section_index_titles
    pub fn section_for_index_title(&self, title: &str, at: usize) -> Option<usize> {
        let mut titled = self
            .sections
            .iter()
            .enumerate()
            .filter_map(|(section, s)| s.index_title.as_deref().map(|t| (section, t)));
        match titled.clone().nth(at) {
            Some((section, t)) if t == title => Some(section),
            _ => titled.find(|&(_, t)| t == title).map(|(section, _)| section),
        }
    }
}

impl<E: PartialEq> ResultSnapshot<E> {
    /// Returns the local path of the first element equal to `element`.
    pub fn index_of(&self, element: &E) -> Option<IndexPath> {
        self.sections.iter().enumerate().find_map(|(section, s)| {
            s.elements
                .iter()
                .position(|e| e == element)
                .map(|row| IndexPath::new(section, row))
        })
    }
}

/// A granular change pushed by a store, in the store's local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<E> {
    /// Opens a batch.
    BeginBatch,
    /// A section was inserted at the index.
    SectionInserted(usize),
    /// The section at the index was deleted.
    SectionDeleted(usize),
    /// The section at the index changed its name.
    SectionUpdated(usize),
    /// A section moved.
    SectionMoved { from: usize, to: usize },
    /// A row was inserted at the (post-batch) path.
    RowInserted(IndexPath),
    /// The row at the (pre-batch) path was deleted.
    RowDeleted(IndexPath),
    /// The element at the path changed in place.
    RowUpdated(IndexPath, E),
    /// A row moved between paths.
    RowMoved { from: IndexPath, to: IndexPath },
    /// Closes a batch, carrying the results after every change in it.
    EndBatch(Arc<ResultSnapshot<E>>),
}

/// A store that can execute fetch requests and report changes.
pub trait ResultsStore<E>: Send + Sync {
    /// Resolves an element type name to an entity of the store's schema.
    fn entity_for_type(&self, type_name: &str) -> Option<String>;

    /// Executes `request` and returns its current results.
    fn execute(&self, request: &FetchRequest) -> Result<Arc<ResultSnapshot<E>>, StoreError>;

    /// The signal on which the store pushes change batches.
    fn changes(&self) -> &Signal<ChangeEvent<E>>;
}
