//! Store-backed list source that follows live changes.
//!
//! `LiveSource` shows the results of a [`FetchRequest`] and keeps its host in
//! sync as the store reports changes. Two update paths exist:
//!
//! - [`reload`](LiveSource::reload) re-executes the request and always
//!   triggers a full `reload_data` on the host.
//! - Change batches from the store's signal are translated, one event at a
//!   time, into the minimal structural mutations, applied inside a single
//!   `begin_updates` / `end_updates` transaction.
//!
//! # Example
//!
//! ```ignore
//! use tablekit::source::{LiveSourceBuilder, SortDescriptor};
//!
//! let contacts = LiveSourceBuilder::new(store, host)
//!     .section_offset(1)
//!     .reuse_identifier("contact")
//!     .sort(SortDescriptor::ascending("last_name"))
//!     .section_key_path("initial")
//!     .configure(|cell: &mut ContactCell, contact: &Contact| cell.show(contact))
//!     .build();
//!
//! contacts.reload()?;
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tablekit_core::logging::targets;
use tablekit_core::{ConnectionGuard, PerfSpan, Signal};

use super::config::LiveSourceConfig;
use super::error::{Result, SourceError};
use super::index::{IndexPath, SectionOffset, SectionOffsetting};
use super::results::{ChangeEvent, FetchRequest, ResultSnapshot, ResultsStore, SortDescriptor};
use super::traits::{ListHost, ListMutation, RowAnimation, SectionedSource, SourceCapabilities};

/// Type alias for the function that renders an element into a cell.
pub type ConfigureElementFn<C, E> = Arc<dyn Fn(&mut C, &E) + Send + Sync>;

/// Translates one change event into the host mutations it implies.
///
/// Paths and sections are shifted by `offset` into combined coordinates.
/// Moves become a delete followed by an insert. Batch markers, row updates,
/// and section updates or moves produce no structural mutation.
pub fn translate<E>(
    event: &ChangeEvent<E>,
    offset: SectionOffset,
    animation: RowAnimation,
) -> Vec<ListMutation> {
    match event {
        ChangeEvent::SectionInserted(section) => {
            vec![ListMutation::InsertSection(offset.to_combined(*section), animation)]
        }
        ChangeEvent::SectionDeleted(section) => {
            vec![ListMutation::DeleteSection(offset.to_combined(*section), animation)]
        }
        ChangeEvent::RowInserted(path) => {
            vec![ListMutation::InsertRow(offset.to_combined_path(*path), animation)]
        }
        ChangeEvent::RowDeleted(path) => {
            vec![ListMutation::DeleteRow(offset.to_combined_path(*path), animation)]
        }
        ChangeEvent::RowMoved { from, to } => vec![
            ListMutation::DeleteRow(offset.to_combined_path(*from), animation),
            ListMutation::InsertRow(offset.to_combined_path(*to), animation),
        ],
        ChangeEvent::BeginBatch
        | ChangeEvent::EndBatch(_)
        | ChangeEvent::RowUpdated(..)
        | ChangeEvent::SectionUpdated(_)
        | ChangeEvent::SectionMoved { .. } => Vec::new(),
    }
}

/// Whether a change batch is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BatchState {
    #[default]
    Idle,
    Open {
        /// Structural mutations applied so far.
        mutations: usize,
    },
}

struct LiveState<E> {
    snapshot: Option<Arc<ResultSnapshot<E>>>,
    batch: BatchState,
}

/// Signals emitted by a live source.
pub struct LiveSourceSignals {
    /// Emitted once per failed reload, after the source has reset.
    pub load_failed: Signal<SourceError>,
    /// Emitted when a change event violates batch bracketing and is dropped.
    pub batch_rejected: Signal<SourceError>,
    /// Emitted after a successful reload with the new section count.
    pub reloaded: Signal<usize>,
}

impl LiveSourceSignals {
    fn new() -> Self {
        Self {
            load_failed: Signal::new(),
            batch_rejected: Signal::new(),
            reloaded: Signal::new(),
        }
    }
}

/// A list source showing the live results of a store query.
///
/// Created with [`LiveSourceBuilder`]. The source holds its host and store
/// through `Arc`s, and subscribes to the store's change signal after the
/// first successful [`reload`](Self::reload).
pub struct LiveSource<E, H: ListHost, S> {
    store: Arc<S>,
    host: Arc<H>,
    request: RwLock<FetchRequest>,
    offset: SectionOffset,
    reuse_identifier: String,
    animation: RowAnimation,
    configure: Option<ConfigureElementFn<H::Cell, E>>,
    state: RwLock<LiveState<E>>,
    subscription: Mutex<Option<ConnectionGuard>>,
    signals: LiveSourceSignals,
    this: Weak<Self>,
}

impl<E, H, S> LiveSource<E, H, S>
where
    E: Clone + PartialEq + Send + Sync + 'static,
    H: ListHost + 'static,
    S: ResultsStore<E> + 'static,
{
    /// Re-executes the fetch request and redraws the host from scratch.
    ///
    /// On failure the source drops its results and unsubscribes from the
    /// store, the host is still redrawn (showing no rows), `load_failed` is
    /// emitted, and the error is returned.
    pub fn reload(&self) -> Result<()> {
        let _span = PerfSpan::new("live_source.reload");

        if self.is_batch_open() {
            return Err(self.reject("reload requested while a change batch is open"));
        }

        let request = self.resolved_request();
        match self.store.execute(&request) {
            Ok(snapshot) => {
                let sections = self.offset.to_combined(snapshot.section_count());
                tracing::debug!(
                    target: targets::LIVE,
                    entity = request.entity.as_deref().unwrap_or("<unresolved>"),
                    sections,
                    elements = snapshot.len(),
                    "fetched results"
                );
                self.state.write().snapshot = Some(snapshot);
                self.subscribe();
                self.host.reload_data();
                self.signals.reloaded.emit(sections);
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    target: targets::LIVE,
                    entity = request.entity.as_deref().unwrap_or("<unresolved>"),
                    error = %err,
                    "could not perform fetch"
                );
                self.state.write().snapshot = None;
                self.subscription.lock().take();
                let err = SourceError::from(err);
                self.host.reload_data();
                self.signals.load_failed.emit(err.clone());
                Err(err)
            }
        }
    }

    /// Applies one change event from the store.
    ///
    /// This is what the store subscription calls; it is public so callers
    /// that receive changes some other way can forward them. Events that
    /// break batch bracketing are dropped, logged, emitted on
    /// `batch_rejected`, and returned as [`SourceError::InvalidBatch`].
    pub fn handle_change(&self, event: &ChangeEvent<E>) -> Result<()> {
        match event {
            ChangeEvent::BeginBatch => {
                {
                    let mut state = self.state.write();
                    if state.batch != BatchState::Idle {
                        drop(state);
                        return Err(self.reject("batch opened while another is open"));
                    }
                    state.batch = BatchState::Open { mutations: 0 };
                }
                tracing::trace!(target: targets::LIVE, "begin change batch");
                self.host.begin_updates();
            }
            ChangeEvent::EndBatch(snapshot) => {
                let mutations = {
                    let mut state = self.state.write();
                    let batch = state.batch;
                    let BatchState::Open { mutations } = batch else {
                        drop(state);
                        return Err(self.reject("batch closed while none is open"));
                    };
                    state.snapshot = Some(snapshot.clone());
                    state.batch = BatchState::Idle;
                    mutations
                };
                tracing::trace!(target: targets::LIVE, mutations, "end change batch");
                self.host.end_updates();
            }
            ChangeEvent::RowUpdated(path, element) => {
                self.require_open_batch()?;
                let combined = self.offset_path(*path);
                let refreshed = self
                    .host
                    .with_visible_cell(combined, &mut |cell| self.render(cell, element));
                tracing::trace!(target: targets::LIVE, path = %combined, refreshed, "row updated");
            }
            ChangeEvent::SectionUpdated(_) | ChangeEvent::SectionMoved { .. } => {
                self.require_open_batch()?;
                tracing::trace!(target: targets::LIVE, kind = section_kind(event), "ignoring section change");
            }
            _ => {
                self.require_open_batch()?;
                let mutations = translate(event, self.offset, self.animation);
                if let BatchState::Open { mutations: applied } = &mut self.state.write().batch {
                    *applied += mutations.len();
                }
                for mutation in mutations {
                    self.host.apply(mutation);
                }
            }
        }
        Ok(())
    }

    fn resolved_request(&self) -> FetchRequest {
        if self.request.read().entity.is_none() {
            let type_name = std::any::type_name::<E>();
            match self.store.entity_for_type(type_name) {
                Some(entity) => {
                    tracing::debug!(target: targets::LIVE, type_name, %entity, "resolved entity");
                    self.request.write().entity = Some(entity);
                }
                None => {
                    tracing::warn!(target: targets::LIVE, type_name, "no entity matches element type");
                }
            }
        }
        self.request.read().clone()
    }

    fn subscribe(&self) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return;
        }
        let source = self.this.clone();
        *subscription = Some(self.store.changes().connect_scoped(move |event| {
            let Some(source) = source.upgrade() else {
                return;
            };
            if let Err(err) = source.handle_change(event) {
                tracing::trace!(target: targets::LIVE, error = %err, "store change dropped");
            }
        }));
    }

    fn require_open_batch(&self) -> Result<()> {
        if self.is_batch_open() {
            Ok(())
        } else {
            Err(self.reject("change received outside a batch"))
        }
    }

    fn reject(&self, reason: &'static str) -> SourceError {
        tracing::warn!(target: targets::LIVE, reason, "rejected change batch event");
        let err = SourceError::InvalidBatch(reason);
        self.signals.batch_rejected.emit(err.clone());
        err
    }
}

fn section_kind<E>(event: &ChangeEvent<E>) -> &'static str {
    match event {
        ChangeEvent::SectionUpdated(_) => "section_updated",
        ChangeEvent::SectionMoved { .. } => "section_moved",
        _ => "other",
    }
}

impl<E, H, S> LiveSource<E, H, S>
where
    E: Clone + PartialEq + Send + Sync + 'static,
    H: ListHost,
{
    fn render(&self, cell: &mut H::Cell, element: &E) {
        if let Some(configure) = &self.configure {
            configure(cell, element);
        }
    }

    /// Returns the current results, if a reload has succeeded.
    pub fn snapshot(&self) -> Option<Arc<ResultSnapshot<E>>> {
        self.state.read().snapshot.clone()
    }

    /// Returns `true` while a change batch is being applied.
    pub fn is_batch_open(&self) -> bool {
        self.state.read().batch != BatchState::Idle
    }

    /// Returns the element at combined `path`.
    pub fn element(&self, path: IndexPath) -> Result<E> {
        let local = self.inset_path(path)?;
        let snapshot = self.snapshot();
        let snapshot = snapshot
            .as_deref()
            .ok_or_else(|| SourceError::section_out_of_range(path.section, self.offset.get()))?;
        match snapshot.row_count(local.section) {
            None => Err(SourceError::section_out_of_range(
                path.section,
                self.offset.to_combined(snapshot.section_count()),
            )),
            Some(rows) => snapshot
                .element(local)
                .cloned()
                .ok_or_else(|| SourceError::row_out_of_range(path.section, path.row, rows)),
        }
    }

    /// Returns the `n`th element across all sections.
    pub fn element_at(&self, n: usize) -> Option<E> {
        self.snapshot()?.element_at(n).cloned()
    }

    /// Returns every element in section-then-row order.
    pub fn elements(&self) -> Option<Vec<E>> {
        Some(self.snapshot()?.iter().cloned().collect())
    }

    /// Returns the combined path of `element`, if it is in the results.
    pub fn index_of(&self, element: &E) -> Option<IndexPath> {
        let local = self.snapshot()?.index_of(element)?;
        Some(self.offset_path(local))
    }

    /// Returns the current fetch request, including any resolved entity.
    pub fn request(&self) -> FetchRequest {
        self.request.read().clone()
    }

    /// Returns the reuse identifier of the source's cells.
    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    /// Returns the source's signals.
    pub fn signals(&self) -> &LiveSourceSignals {
        &self.signals
    }

    /// Returns the attached host.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<E, H: ListHost, S> SectionOffsetting for LiveSource<E, H, S> {
    fn section_offset(&self) -> SectionOffset {
        self.offset
    }
}

impl<E, H: ListHost, S> fmt::Debug for LiveSource<E, H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("LiveSource")
            .field("request", &*self.request.read())
            .field("offset", &self.offset)
            .field("reuse_identifier", &self.reuse_identifier)
            .field("loaded", &state.snapshot.is_some())
            .field("batch", &state.batch)
            .finish_non_exhaustive()
    }
}

impl<E, H, S> SectionedSource<H> for LiveSource<E, H, S>
where
    E: Clone + PartialEq + Send + Sync + 'static,
    H: ListHost,
    S: Send + Sync,
{
    fn section_count(&self) -> usize {
        let sections = self.snapshot().map_or(0, |s| s.section_count());
        self.offset.to_combined(sections)
    }

    fn row_count(&self, section: usize) -> Result<usize> {
        let local = self.offset.to_local(section)?;
        let snapshot = self.snapshot();
        snapshot
            .as_deref()
            .and_then(|s| s.row_count(local))
            .ok_or_else(|| {
                let loaded = snapshot.as_deref().map_or(0, |s| s.section_count());
                SourceError::section_out_of_range(section, self.offset.to_combined(loaded))
            })
    }

    fn cell(&self, host: &H, path: IndexPath) -> Result<H::Cell> {
        let element = self.element(path)?;
        let mut cell = host.dequeue_reusable_cell(&self.reuse_identifier, path);
        self.render(&mut cell, &element);
        Ok(cell)
    }

    fn header_title(&self, section: usize) -> Result<Option<String>> {
        let local = self.offset.to_local(section)?;
        let snapshot = self.snapshot();
        let group = snapshot
            .as_deref()
            .and_then(|s| s.section(local))
            .ok_or_else(|| SourceError::section_out_of_range(section, self.section_count()))?;
        Ok((!group.name.is_empty()).then(|| group.name.clone()))
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::new().with_section_index(true)
    }

    fn section_index_titles(&self) -> Option<Vec<String>> {
        Some(self.snapshot()?.section_index_titles())
    }

    fn section_for_index_title(&self, title: &str, at: usize) -> Option<usize> {
        let local = self.snapshot()?.section_for_index_title(title, at)?;
        Some(self.offset.to_combined(local))
    }
}

/// Builder for [`LiveSource`].
pub struct LiveSourceBuilder<E, H: ListHost, S> {
    store: Arc<S>,
    host: Arc<H>,
    request: FetchRequest,
    config: LiveSourceConfig,
    configure: Option<ConfigureElementFn<H::Cell, E>>,
}

impl<E, H, S> LiveSourceBuilder<E, H, S>
where
    E: Clone + PartialEq + Send + Sync + 'static,
    H: ListHost + 'static,
    S: ResultsStore<E> + 'static,
{
    /// Starts a builder for a source over `store`, displayed by `host`.
    pub fn new(store: Arc<S>, host: Arc<H>) -> Self {
        Self {
            store,
            host,
            request: FetchRequest::new(),
            config: LiveSourceConfig::default(),
            configure: None,
        }
    }

    /// Applies a whole configuration, replacing earlier settings it covers.
    pub fn config(mut self, config: LiveSourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the entity instead of inferring it from the element type.
    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.request.entity = Some(entity.into());
        self
    }

    /// Appends a sort descriptor.
    pub fn sort(mut self, descriptor: SortDescriptor) -> Self {
        self.request.sort.push(descriptor);
        self
    }

    /// Sets the section offset.
    pub fn section_offset(mut self, offset: usize) -> Self {
        self.config.section_offset = offset;
        self
    }

    /// Sets the reuse identifier of the source's cells.
    pub fn reuse_identifier(mut self, reuse_identifier: impl Into<String>) -> Self {
        self.config.reuse_identifier = reuse_identifier.into();
        self
    }

    /// Groups elements into sections by the value at `key_path`.
    pub fn section_key_path(mut self, key_path: impl Into<String>) -> Self {
        self.config.section_key_path = Some(key_path.into());
        self
    }

    /// Sets the cache name passed through to the store.
    pub fn cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.config.cache_name = Some(cache_name.into());
        self
    }

    /// Sets the animation for structural changes.
    pub fn animation(mut self, animation: RowAnimation) -> Self {
        self.config.animation = animation;
        self
    }

    /// Sets the function that renders an element into a cell.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: Fn(&mut H::Cell, &E) + Send + Sync + 'static,
    {
        self.configure = Some(Arc::new(configure));
        self
    }

    /// Builds the source. No query runs until [`LiveSource::reload`].
    pub fn build(self) -> Arc<LiveSource<E, H, S>> {
        let LiveSourceBuilder {
            store,
            host,
            mut request,
            config,
            configure,
        } = self;
        request.section_key_path = config.section_key_path;
        request.cache_name = config.cache_name;

        Arc::new_cyclic(|this| LiveSource {
            store,
            host,
            request: RwLock::new(request),
            offset: SectionOffset::new(config.section_offset),
            reuse_identifier: config.reuse_identifier,
            animation: config.animation,
            configure,
            state: RwLock::new(LiveState {
                snapshot: None,
                batch: BatchState::Idle,
            }),
            subscription: Mutex::new(None),
            signals: LiveSourceSignals::new(),
            this: this.clone(),
        })
    }
}
