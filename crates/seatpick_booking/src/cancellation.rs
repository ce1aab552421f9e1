//! Cancelling an existing booking.

use std::sync::Arc;
use tracing::{info, warn};

use seatpick_common::models::BookingId;
use seatpick_common::services::{
    ConfirmationGate, Notice, NoticeKind, Notifier, ReservationBackend,
};

use crate::cache::{CacheConsistencyManager, CacheKey, CachedData, ViewCache};
use crate::error::BookingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// The user answered "no" at the confirmation gate.
    Declined,
    /// The backend refused; the booking list is left as it was.
    Failed { message: String },
}

pub struct CancellationFlow {
    backend: Arc<dyn ReservationBackend>,
    cache: Arc<ViewCache>,
    cache_manager: CacheConsistencyManager,
    gate: Arc<dyn ConfirmationGate>,
    notifier: Arc<dyn Notifier>,
}

impl CancellationFlow {
    pub fn new(
        backend: Arc<dyn ReservationBackend>,
        cache: Arc<ViewCache>,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache_manager = CacheConsistencyManager::new(cache.clone());
        Self {
            backend,
            cache,
            cache_manager,
            gate,
            notifier,
        }
    }

    /// Cancels `booking_id` after confirmation.
    ///
    /// A booking known to be CANCELLED or COMPLETED is refused without a network call.
    /// Bookings not in the list cache are left for the backend to judge.
    pub async fn cancel(&self, booking_id: BookingId) -> Result<CancelOutcome, BookingError> {
        if let Some(CachedData::Bookings(bookings)) = self.cache.peek(&CacheKey::MyBookings) {
            if let Some(known) = bookings.iter().find(|b| b.id == booking_id) {
                if known.status.is_terminal() {
                    return Err(BookingError::NotCancellable {
                        booking_id,
                        status: known.status,
                    });
                }
            }
        }

        let prompt = format!("Cancel booking {}?", booking_id);
        if !self.gate.confirm(&prompt).await {
            self.notifier.notify(Notice::new(
                NoticeKind::Info,
                format!("Booking {} was kept.", booking_id),
            ));
            return Ok(CancelOutcome::Declined);
        }

        match self.backend.cancel_booking(booking_id).await {
            Ok(()) => {
                info!("booking {} cancelled", booking_id);
                self.cache_manager.booking_cancelled();
                self.notifier.notify(Notice::new(
                    NoticeKind::Success,
                    format!("Booking {} was cancelled.", booking_id),
                ));
                Ok(CancelOutcome::Cancelled)
            }
            Err(e) => {
                warn!("cancelling booking {} failed: {}", booking_id, e);
                let message = e.to_string();
                self.notifier.notify(Notice::new(
                    NoticeKind::Failure,
                    format!("Booking {} could not be cancelled: {}", booking_id, message),
                ));
                Ok(CancelOutcome::Failed { message })
            }
        }
    }
}
