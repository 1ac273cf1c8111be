//! Integration tests for signal dispatch across threads and scopes.

use std::sync::Arc;

use parking_lot::Mutex;
use tablekit_core::Signal;

#[test]
fn test_emit_from_another_thread_runs_slot_there() {
    let signal = Arc::new(Signal::<i32>::new());
    let slot_thread = Arc::new(Mutex::new(None));

    let slot_thread_clone = slot_thread.clone();
    signal.connect(move |_| {
        *slot_thread_clone.lock() = Some(std::thread::current().id());
    });

    let signal_clone = signal.clone();
    let emitting_thread = std::thread::spawn(move || {
        signal_clone.emit(7);
        std::thread::current().id()
    })
    .join()
    .unwrap();

    assert_eq!(*slot_thread.lock(), Some(emitting_thread));
}

#[test]
fn test_guard_disconnect_is_explicit() {
    let signal = Signal::<&'static str>::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    let received_clone = received.clone();
    let guard = signal.connect_scoped(move |value| received_clone.lock().push(*value));
    signal.emit("before");
    guard.disconnect();
    signal.emit("after");

    assert_eq!(*received.lock(), vec!["before"]);
}

#[test]
fn test_emission_is_traced_with_subscriber_installed() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let signal = Signal::<()>::new();
        signal.connect(|_| {});
        assert_eq!(signal.emit(()), 1);
    });
}
