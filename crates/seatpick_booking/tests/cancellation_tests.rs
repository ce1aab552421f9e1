use seatpick_booking::{
    BookingError, BookingListViewModel, CacheKey, CancelOutcome, CancellationFlow, SpaceDirectory,
};
use seatpick_common::models::{Booking, BookingStatus};
use seatpick_common::services::NoticeKind;
use seatpick_common::SeatpickError;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use fixtures::{event_log, test_date, FakeBackend, RecordingNotifier, ScriptedGate};
use seatpick_booking::ViewCache;

fn booking(id: i64, status: BookingStatus) -> Booking {
    Booking {
        id,
        space_id: Some(1),
        space_name: Some("Room A".into()),
        date: test_date(),
        start_time: "10:00:00".into(),
        end_time: "11:00:00".into(),
        status,
    }
}

struct CancelHarness {
    backend: Arc<FakeBackend>,
    cache: Arc<ViewCache>,
    notifier: Arc<RecordingNotifier>,
    gate: Arc<ScriptedGate>,
    flow: CancellationFlow,
    list: BookingListViewModel,
}

fn harness(answer: bool) -> CancelHarness {
    let backend = Arc::new(FakeBackend::new(event_log()));
    backend.add_booking(booking(1, BookingStatus::Confirmed));
    backend.add_booking(booking(2, BookingStatus::Cancelled));
    backend.add_booking(booking(3, BookingStatus::Completed));
    let cache = ViewCache::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let gate = Arc::new(ScriptedGate::answering(answer));
    let flow = CancellationFlow::new(
        backend.clone(),
        cache.clone(),
        gate.clone(),
        notifier.clone(),
    );
    let list = BookingListViewModel::new(backend.clone(), cache.clone());
    CancelHarness {
        backend,
        cache,
        notifier,
        gate,
        flow,
        list,
    }
}

#[tokio::test]
async fn test_cancel_confirmed_booking() {
    let h = harness(true);
    let rows = h.list.rows().await.unwrap();
    assert_eq!(
        rows.iter().map(|r| r.cancellable).collect::<Vec<_>>(),
        vec![true, false, false]
    );

    let outcome = h.flow.cancel(1).await.unwrap();

    assert_eq!(outcome, CancelOutcome::Cancelled);
    assert!(h.cache.is_stale(&CacheKey::MyBookings));
    assert_eq!(h.notifier.notices()[0].kind, NoticeKind::Success);
    assert!(h.gate.prompts()[0].contains('1'));

    let rows = h.list.rows().await.unwrap();
    assert_eq!(rows[0].status, BookingStatus::Cancelled);
    assert!(!rows[0].cancellable);
    assert_eq!(h.backend.my_booking_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_terminal_bookings_are_refused_without_network_call() {
    let h = harness(true);
    h.list.rows().await.unwrap();

    for id in [2, 3] {
        let result = h.flow.cancel(id).await;
        assert!(matches!(
            result,
            Err(BookingError::NotCancellable { booking_id, .. }) if booking_id == id
        ));
    }
    assert_eq!(h.backend.cancel_calls.load(Ordering::SeqCst), 0);
    assert!(h.gate.prompts().is_empty());
    assert!(!h.cache.is_stale(&CacheKey::MyBookings));
}

#[tokio::test]
async fn test_declined_cancellation_changes_nothing() {
    let h = harness(false);
    h.list.rows().await.unwrap();

    let outcome = h.flow.cancel(1).await.unwrap();

    assert_eq!(outcome, CancelOutcome::Declined);
    assert_eq!(h.backend.cancel_calls.load(Ordering::SeqCst), 0);
    assert!(!h.cache.is_stale(&CacheKey::MyBookings));
    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Info);
    assert!(notices[0].message.contains('1'));
}

#[tokio::test]
async fn test_backend_failure_leaves_lists_untouched() {
    let h = harness(true);
    h.list.rows().await.unwrap();
    h.backend
        .fail_next_cancel(SeatpickError::ValidationError("too late to cancel".into()));

    let outcome = h.flow.cancel(1).await.unwrap();

    let CancelOutcome::Failed { message } = outcome else {
        panic!("expected a failure");
    };
    assert!(message.contains("too late to cancel"));
    assert!(!h.cache.is_stale(&CacheKey::MyBookings));
    assert_eq!(h.notifier.notices()[0].kind, NoticeKind::Failure);
}

#[tokio::test]
async fn test_unknown_booking_is_left_to_the_backend() {
    let h = harness(true);

    let outcome = h.flow.cancel(42).await.unwrap();

    assert!(matches!(outcome, CancelOutcome::Failed { .. }));
    assert_eq!(h.backend.cancel_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_space_directory_caches_reference_data() {
    let backend = Arc::new(FakeBackend::new(event_log()));
    let directory = SpaceDirectory::new(backend.clone(), ViewCache::new());

    assert_eq!(directory.list().await.unwrap().len(), 1);
    assert_eq!(directory.list().await.unwrap().len(), 1);
    assert_eq!(directory.get(1).await.unwrap().name, "Room A");
    assert_eq!(directory.get(1).await.unwrap().category, "MEETING_ROOM");
    assert!(matches!(
        directory.get(9).await,
        Err(SeatpickError::NotFoundError(_))
    ));
    // list once, space 1 once, space 9 once
    assert_eq!(backend.space_calls.load(Ordering::SeqCst), 3);
}
