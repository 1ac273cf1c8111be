//! Typed signals for change notification.
//!
//! A [`Signal<Args>`] keeps a set of connected slots (closures) and invokes
//! each of them, in connection order, when the signal is emitted. Backing
//! stores use a signal to push change batches to list sources, and sources
//! use signals to report recoverable failures.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`ConnectionGuard`] - Disconnects its slot when dropped
//!
//! # Dispatch
//!
//! Slots run synchronously on the emitting thread. The connection table is
//! not locked while slots run, so a slot may connect or disconnect slots on
//! the same signal; such changes take effect from the next emission.
//!
//! # Example
//!
//! ```
//! use tablekit_core::Signal;
//!
//! let rows_changed = Signal::<usize>::new();
//!
//! let conn_id = rows_changed.connect(|count| {
//!     println!("now showing {count} rows");
//! });
//!
//! rows_changed.emit(12);
//! rows_changed.disconnect(conn_id);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type SlotTable<Args> = Mutex<SlotMap<ConnectionId, Slot<Args>>>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
pub struct Signal<Args> {
    connections: Arc<SlotTable<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Connect a slot that is disconnected when the returned guard is dropped.
    ///
    /// The guard only holds a weak reference to the connection table, so it
    /// may safely outlive the signal.
    ///
    /// ```
    /// use tablekit_core::Signal;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let signal = Signal::<usize>::new();
    /// let total = Arc::new(AtomicUsize::new(0));
    /// {
    ///     let total = total.clone();
    ///     let _guard = signal.connect_scoped(move |&n| {
    ///         total.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(3);
    /// }
    /// signal.emit(4);
    /// assert_eq!(total.load(Ordering::SeqCst), 3);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let table: Weak<SlotTable<Args>> = Arc::downgrade(&self.connections);
        ConnectionGuard {
            id,
            disconnect: Some(Box::new(move |id| {
                if let Some(table) = table.upgrade() {
                    table.lock().remove(id);
                }
            })),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emit the signal, invoking every connected slot in connection order.
    ///
    /// Returns the number of slots invoked.
    #[tracing::instrument(skip_all, target = "tablekit_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in &slots {
            slot(&args);
        }
        slots.len()
    }
}

/// A connection guard that disconnects its slot when dropped.
///
/// Created via [`Signal::connect_scoped`].
pub struct ConnectionGuard {
    id: ConnectionId,
    disconnect: Option<Box<dyn FnOnce(ConnectionId) + Send + Sync>>,
}

impl ConnectionGuard {
    /// Returns the id of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Disconnects the slot now instead of at drop.
    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect(self.id);
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ConnectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("id", &self.id)
            .field("connected", &self.disconnect.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in for the change events a store pushes to its sources.
    #[derive(Debug, Clone, PartialEq)]
    enum Change {
        Begin,
        Inserted(usize),
        End,
    }

    fn record(signal: &Signal<Change>) -> (ConnectionId, Arc<Mutex<Vec<Change>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let id = signal.connect(move |change| log_clone.lock().push(change.clone()));
        (id, log)
    }

    #[test]
    fn test_batch_arrives_in_emission_order() {
        let changes = Signal::new();
        let (_, log) = record(&changes);

        for change in [Change::Begin, Change::Inserted(0), Change::Inserted(1), Change::End] {
            assert_eq!(changes.emit(change), 1);
        }

        assert_eq!(
            *log.lock(),
            vec![Change::Begin, Change::Inserted(0), Change::Inserted(1), Change::End]
        );
    }

    #[test]
    fn test_every_subscriber_sees_each_change() {
        let changes = Signal::new();
        let (_, first) = record(&changes);
        let (_, second) = record(&changes);

        assert_eq!(changes.emit(Change::Inserted(4)), 2);
        assert_eq!(*first.lock(), vec![Change::Inserted(4)]);
        assert_eq!(*second.lock(), *first.lock());
    }

    #[test]
    fn test_disconnected_subscriber_misses_later_batches() {
        let changes = Signal::new();
        let (id, log) = record(&changes);

        changes.emit(Change::Begin);
        assert!(changes.disconnect(id));
        assert!(!changes.disconnect(id));
        changes.emit(Change::End);

        assert_eq!(*log.lock(), vec![Change::Begin]);
        assert_eq!(changes.emit(Change::Begin), 0);
    }

    #[test]
    fn test_dropping_guard_ends_subscription() {
        let changes = Signal::<Change>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_clone = log.clone();
        let guard = changes.connect_scoped(move |change| log_clone.lock().push(change.clone()));
        assert_eq!(changes.connection_count(), 1);

        changes.emit(Change::Inserted(2));
        drop(guard);
        changes.emit(Change::Inserted(3));

        assert_eq!(*log.lock(), vec![Change::Inserted(2)]);
        assert_eq!(changes.connection_count(), 0);
    }

    #[test]
    fn test_guard_outlives_signal() {
        let guard = {
            let changes = Signal::<Change>::new();
            changes.connect_scoped(|_| {})
        };
        drop(guard);
    }

    #[test]
    fn test_subscriber_may_leave_mid_batch() {
        let changes = Arc::new(Signal::<Change>::new());
        let own_id: Arc<Mutex<Option<ConnectionId>>> = Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&changes);
        let own_id_clone = own_id.clone();
        let seen_clone = seen.clone();
        let id = changes.connect(move |change| {
            seen_clone.lock().push(change.clone());
            if *change == Change::End {
                if let (Some(changes), Some(id)) = (weak.upgrade(), *own_id_clone.lock()) {
                    changes.disconnect(id);
                }
            }
        });
        *own_id.lock() = Some(id);

        changes.emit(Change::Begin);
        changes.emit(Change::End);
        changes.emit(Change::Begin);

        assert_eq!(*seen.lock(), vec![Change::Begin, Change::End]);
        assert_eq!(changes.connection_count(), 0);
    }
}
