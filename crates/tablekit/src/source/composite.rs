//! Section-addressed routing across several sources.
//!
//! `CompositeSource` presents one root source plus a sparse table of
//! per-section overrides as a single list. Every query for section `s` goes
//! to the override registered at `s`, or to the root when there is none.
//!
//! Sections past the root's own range belong to the *tail* delegate: the
//! override registered at the root's last section. That delegate (usually a
//! source with a [`SectionOffset`](super::SectionOffset)) also answers the
//! composite's section count, so it can grow the list beyond the root.
//!
//! ```text
//!   combined    root: 2 sections     overrides
//!   section 0   root
//!   section 1   ──────────────────>  live source (offset 1)
//!   section 2   ──────────────────>  live source (tail)
//!   section 3   ──────────────────>  live source (tail)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tablekit_core::logging::targets;

use super::error::{Result, SourceError};
use super::index::IndexPath;
use super::traits::{EditKind, ListHost, SectionedSource, SourceCapabilities};

/// A shared, type-erased source for hosts of type `H`.
pub type SharedSource<H> = Arc<dyn SectionedSource<H>>;

/// Where a composite takes header and footer titles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPolicy {
    /// Titles come from the source each section resolves to.
    #[default]
    Delegate,
    /// Titles always come from the root; overrides only contribute rows.
    Root,
}

/// A list source that routes each section to a root or override source.
///
/// Composites implement [`SectionedSource`] themselves, so they nest.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tablekit::source::CompositeSource;
///
/// // Section 0 is a static "account" section; the rest come from the store.
/// let composite = CompositeSource::new(settings);
/// composite.set_override(1, contacts.clone());
///
/// host.set_source(Arc::new(composite));
/// ```
pub struct CompositeSource<H: ListHost> {
    root: SharedSource<H>,
    overrides: RwLock<BTreeMap<usize, SharedSource<H>>>,
    header_policy: HeaderPolicy,
}

impl<H: ListHost> CompositeSource<H> {
    /// Creates a composite over `root` with no overrides.
    pub fn new(root: SharedSource<H>) -> Self {
        Self {
            root,
            overrides: RwLock::new(BTreeMap::new()),
            header_policy: HeaderPolicy::Delegate,
        }
    }

    /// Creates a composite whose header and footer titles always come from
    /// the root.
    pub fn with_root_headers(root: SharedSource<H>) -> Self {
        Self::new(root).with_header_policy(HeaderPolicy::Root)
    }

    /// Sets the header policy.
    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    /// Returns the header policy.
    pub fn header_policy(&self) -> HeaderPolicy {
        self.header_policy
    }

    /// Returns the root source.
    pub fn root(&self) -> &SharedSource<H> {
        &self.root
    }

    /// Registers `source` for combined section `section`.
    ///
    /// Returns the override previously registered there. An override past
    /// the root's current range stays inert until the root grows into it.
    pub fn set_override(&self, section: usize, source: SharedSource<H>) -> Option<SharedSource<H>> {
        tracing::debug!(target: targets::COMPOSITE, section, "set override");
        self.overrides.write().insert(section, source)
    }

    /// Registers `source` for the section containing `path`.
    pub fn set_row_override(&self, path: IndexPath, source: SharedSource<H>) -> Option<SharedSource<H>> {
        self.set_override(path.section, source)
    }

    /// Removes the override at `section`, returning it.
    pub fn remove_override(&self, section: usize) -> Option<SharedSource<H>> {
        tracing::debug!(target: targets::COMPOSITE, section, "remove override");
        self.overrides.write().remove(&section)
    }

    /// Returns the override registered at `section`, if any.
    pub fn override_at(&self, section: usize) -> Option<SharedSource<H>> {
        self.overrides.read().get(&section).cloned()
    }

    /// Returns the sections that have an override, in ascending order.
    pub fn override_sections(&self) -> Vec<usize> {
        self.overrides.read().keys().copied().collect()
    }

    /// Returns the source that answers queries for `section`.
    ///
    /// # Panics
    ///
    /// Panics if `section` lies past the root's range and no tail override
    /// is registered. That is a wiring error, not a data condition; use
    /// [`try_resolve`](Self::try_resolve) to check without panicking.
    pub fn resolve(&self, section: usize) -> SharedSource<H> {
        match self.try_resolve(section) {
            Ok(source) => source,
            Err(err) => {
                tracing::error!(target: targets::COMPOSITE, section, "{err}");
                panic!("{err}");
            }
        }
    }

    /// Returns the source that answers queries for `section`, or
    /// [`SourceError::MisconfiguredComposite`] when the tail override is
    /// missing.
    pub fn try_resolve(&self, section: usize) -> Result<SharedSource<H>> {
        let root_sections = self.root.section_count();
        let overrides = self.overrides.read();
        if section < root_sections {
            return Ok(overrides.get(&section).unwrap_or(&self.root).clone());
        }
        root_sections
            .checked_sub(1)
            .and_then(|tail| overrides.get(&tail))
            .cloned()
            .ok_or(SourceError::MisconfiguredComposite { section })
    }

    fn title_source(&self, section: usize) -> SharedSource<H> {
        match self.header_policy {
            HeaderPolicy::Delegate => self.resolve(section),
            HeaderPolicy::Root => self.root.clone(),
        }
    }

    /// The delegate of the root's last section, which sizes the composite.
    fn tail(&self) -> Option<SharedSource<H>> {
        let last = self.root.section_count().checked_sub(1)?;
        Some(self.resolve(last))
    }
}

impl<H: ListHost> fmt::Debug for CompositeSource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSource")
            .field("overrides", &self.override_sections())
            .field("header_policy", &self.header_policy)
            .finish_non_exhaustive()
    }
}

impl<H: ListHost> SectionedSource<H> for CompositeSource<H> {
    fn section_count(&self) -> usize {
        match self.tail() {
            Some(tail) => tail.section_count(),
            None => {
                tracing::trace!(target: targets::COMPOSITE, "root has no sections");
                0
            }
        }
    }

    fn row_count(&self, section: usize) -> Result<usize> {
        self.resolve(section).row_count(section)
    }

    fn cell(&self, host: &H, path: IndexPath) -> Result<H::Cell> {
        self.resolve(path.section).cell(host, path)
    }

    fn header_title(&self, section: usize) -> Result<Option<String>> {
        self.title_source(section).header_title(section)
    }

    fn footer_title(&self, section: usize) -> Result<Option<String>> {
        self.title_source(section).footer_title(section)
    }

    fn can_edit(&self, path: IndexPath) -> bool {
        self.resolve(path.section).can_edit(path)
    }

    fn commit_edit(&self, kind: EditKind, path: IndexPath) -> Result<()> {
        self.resolve(path.section).commit_edit(kind, path)
    }

    fn capabilities(&self) -> SourceCapabilities {
        let overrides: Vec<_> = self.overrides.read().values().cloned().collect();
        let editing = self.root.capabilities().editing
            || overrides.iter().any(|source| source.capabilities().editing);
        let section_index = self
            .tail()
            .is_some_and(|tail| tail.capabilities().section_index);
        SourceCapabilities::new()
            .with_editing(editing)
            .with_section_index(section_index)
    }

    fn section_index_titles(&self) -> Option<Vec<String>> {
        self.tail()?.section_index_titles()
    }

    fn section_for_index_title(&self, title: &str, at: usize) -> Option<usize> {
        self.tail()?.section_for_index_title(title, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::static_source::{Row, Section, StaticSource};
    use crate::source::traits::ListMutation;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct TextHost;

    impl ListHost for TextHost {
        type Cell = String;

        fn dequeue_reusable_cell(&self, reuse_identifier: &str, _path: IndexPath) -> String {
            reuse_identifier.to_string()
        }

        fn with_visible_cell(&self, _path: IndexPath, _update: &mut dyn FnMut(&mut String)) -> bool {
            false
        }

        fn begin_updates(&self) {}
        fn apply(&self, _mutation: ListMutation) {}
        fn end_updates(&self) {}
        fn reload_data(&self) {}
    }

    fn section(id: &str, rows: usize) -> Section<String> {
        let rows = (0..rows)
            .map(|_| Row::new(id, |cell: &mut String, path: IndexPath| cell.push_str(&format!(" {path}"))))
            .collect();
        Section::new(rows).with_header(id).with_footer(format!("{id} footer"))
    }

    fn shared(source: StaticSource<String>) -> SharedSource<TextHost> {
        Arc::new(source)
    }

    /// Root with two sections: "root0" (1 row) and "root1" (2 rows).
    fn create_test_root() -> SharedSource<TextHost> {
        shared(StaticSource::new(vec![section("root0", 1), section("root1", 2)]))
    }

    /// A tail source occupying combined sections 1..=3.
    fn create_test_tail() -> SharedSource<TextHost> {
        shared(StaticSource::with_offset(
            vec![section("tail1", 3), section("tail2", 0), section("tail3", 1)],
            1,
        ))
    }

    /// Editable single-section source that records committed edits.
    #[derive(Default)]
    struct Editable {
        commits: Mutex<Vec<(EditKind, IndexPath)>>,
    }

    impl SectionedSource<TextHost> for Editable {
        fn row_count(&self, _section: usize) -> Result<usize> {
            Ok(1)
        }

        fn cell(&self, host: &TextHost, path: IndexPath) -> Result<String> {
            Ok(host.dequeue_reusable_cell("editable", path))
        }

        fn can_edit(&self, _path: IndexPath) -> bool {
            true
        }

        fn commit_edit(&self, kind: EditKind, path: IndexPath) -> Result<()> {
            self.commits.lock().push((kind, path));
            Ok(())
        }

        fn capabilities(&self) -> SourceCapabilities {
            SourceCapabilities::new().with_editing(true)
        }
    }

    #[test]
    fn test_routing() {
        let root = create_test_root();
        let tail = create_test_tail();
        let composite = CompositeSource::new(root.clone());
        composite.set_override(1, tail.clone());

        assert!(Arc::ptr_eq(&composite.resolve(0), &root));
        assert!(Arc::ptr_eq(&composite.resolve(1), &tail));
        assert!(Arc::ptr_eq(&composite.resolve(2), &tail));
        assert!(Arc::ptr_eq(&composite.resolve(30), &tail));
    }

    #[test]
    fn test_tail_delegate_sizes_the_list() {
        let composite = CompositeSource::new(create_test_root());
        assert_eq!(composite.section_count(), 2);

        composite.set_override(1, create_test_tail());
        assert_eq!(composite.section_count(), 4);
        assert_eq!(composite.row_count(0), Ok(1));
        assert_eq!(composite.row_count(1), Ok(3));
        assert_eq!(composite.row_count(2), Ok(0));
        assert_eq!(composite.row_count(3), Ok(1));
        assert!(composite.row_count(4).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_cells_come_from_the_resolved_source() {
        let composite = CompositeSource::new(create_test_root());
        composite.set_override(1, create_test_tail());
        let host = TextHost;

        assert_eq!(composite.cell(&host, IndexPath::new(0, 0)), Ok("root0 [0, 0]".to_string()));
        assert_eq!(composite.cell(&host, IndexPath::new(3, 0)), Ok("tail3 [3, 0]".to_string()));
        assert!(composite.cell(&host, IndexPath::new(1, 3)).is_err());
    }

    #[test]
    fn test_every_counted_row_renders() {
        let composite = CompositeSource::new(create_test_root());
        composite.set_override(1, create_test_tail());
        let host = TextHost;

        for section in 0..composite.section_count() {
            for row in 0..composite.row_count(section).unwrap() {
                assert!(composite.cell(&host, IndexPath::new(section, row)).is_ok());
            }
        }
    }

    #[test]
    fn test_header_policies() {
        let delegate = CompositeSource::new(create_test_root());
        delegate.set_override(1, create_test_tail());
        assert_eq!(delegate.header_title(1), Ok(Some("tail1".to_string())));
        assert_eq!(delegate.footer_title(3), Ok(Some("tail3 footer".to_string())));

        let root_headers = CompositeSource::with_root_headers(create_test_root());
        root_headers.set_override(1, create_test_tail());
        assert_eq!(root_headers.header_policy(), HeaderPolicy::Root);
        assert_eq!(root_headers.header_title(1), Ok(Some("root1".to_string())));
        assert_eq!(root_headers.footer_title(1), Ok(Some("root1 footer".to_string())));
        assert!(root_headers.header_title(3).is_err());
        assert_eq!(root_headers.row_count(1), Ok(3));
    }

    #[test]
    fn test_inert_override() {
        let root = create_test_root();
        let composite = CompositeSource::new(root.clone());
        composite.set_override(5, create_test_tail());

        assert_eq!(composite.section_count(), 2);
        assert!(Arc::ptr_eq(&composite.resolve(1), &root));
        assert_eq!(
            composite.try_resolve(2).err(),
            Some(SourceError::MisconfiguredComposite { section: 2 })
        );
    }

    #[test]
    #[should_panic(expected = "No override registered for tail section 2")]
    fn test_missing_tail_override_panics() {
        let composite = CompositeSource::new(create_test_root());
        composite.resolve(2);
    }

    #[test]
    fn test_override_table() {
        let composite = CompositeSource::new(create_test_root());
        let tail = create_test_tail();

        assert!(composite.set_override(1, tail.clone()).is_none());
        assert!(composite.set_row_override(IndexPath::new(1, 7), tail.clone()).is_some());
        assert!(composite.override_at(0).is_none());
        assert_eq!(composite.override_sections(), vec![1]);
        assert!(composite.remove_override(1).is_some());
        assert!(composite.remove_override(1).is_none());
        assert_eq!(composite.section_count(), 2);
    }

    #[test]
    fn test_edits_forward_to_delegate() {
        let editable = Arc::new(Editable::default());
        let composite = CompositeSource::new(create_test_root());
        assert!(!composite.capabilities().editing);

        composite.set_override(0, editable.clone());
        let path = IndexPath::new(0, 0);

        assert!(composite.capabilities().editing);
        assert!(composite.can_edit(path));
        assert!(!composite.can_edit(IndexPath::new(1, 0)));
        composite.commit_edit(EditKind::Delete, path).unwrap();
        assert_eq!(*editable.commits.lock(), vec![(EditKind::Delete, path)]);
        assert_eq!(
            composite.commit_edit(EditKind::Insert, IndexPath::new(1, 1)),
            Err(SourceError::EditNotSupported { section: 1, row: 1 })
        );
    }

    #[test]
    fn test_composites_nest() {
        let inner = CompositeSource::new(create_test_tail());
        inner.set_override(3, shared(StaticSource::with_offset(vec![section("deep", 2)], 3)));
        let inner: SharedSource<TextHost> = Arc::new(inner);

        let outer = CompositeSource::new(create_test_root());
        outer.set_override(1, inner);

        assert_eq!(outer.section_count(), 4);
        assert_eq!(outer.row_count(3), Ok(2));
        assert_eq!(outer.header_title(3), Ok(Some("deep".to_string())));
        assert_eq!(outer.cell(&TextHost, IndexPath::new(3, 1)), Ok("deep [3, 1]".to_string()));
    }

    #[test]
    fn test_empty_root() {
        let composite = CompositeSource::new(shared(StaticSource::new(Vec::new())));
        assert_eq!(composite.section_count(), 0);
        assert!(composite.section_index_titles().is_none());
        assert!(!composite.capabilities().section_index);
    }
}
