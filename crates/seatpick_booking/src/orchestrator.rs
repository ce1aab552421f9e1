//! The booking orchestrator: payment, then booking creation, then cache invalidation.
//!
//! One attempt walks
//! `Idle -> PaymentInFlight -> (PaymentFailed | PaymentSucceeded -> BookingRequested ->
//! (BookingConfirmed | BookingRejected))` and falls back to `Idle` after its terminal state
//! has been acknowledged. The booking-creation call is only ever made after a successful
//! payment outcome, and at most once per outcome.

use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

use seatpick_common::models::{Booking, CreateBookingRequest, Slot, SlotKey, SlotStatus, SpaceId};
use seatpick_common::services::{
    ConfirmationGate, Notice, NoticeKind, Notifier, PaymentGateway, PaymentOutcome,
    PaymentRequest, ReservationBackend,
};
use seatpick_common::SeatpickError;
use seatpick_config::AppConfig;

use crate::cache::CacheConsistencyManager;
use crate::error::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    PaymentInFlight,
    PaymentFailed,
    PaymentSucceeded,
    BookingRequested,
    BookingConfirmed,
    BookingRejected,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Why the backend refused a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Someone else holds the slot.
    Conflict,
    Validation,
    Unauthorized,
    /// The request never made it or never came back.
    Transport,
    Other,
}

impl From<&SeatpickError> for RejectionKind {
    fn from(err: &SeatpickError) -> Self {
        match err {
            SeatpickError::ConflictError(_) => RejectionKind::Conflict,
            SeatpickError::ValidationError(_) => RejectionKind::Validation,
            SeatpickError::AuthError(_) => RejectionKind::Unauthorized,
            SeatpickError::HttpError(_) | SeatpickError::TimeoutError(_) => {
                RejectionKind::Transport
            }
            _ => RejectionKind::Other,
        }
    }
}

/// The terminal result of one selection.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Confirmed {
        booking: Booking,
        merchant_uid: String,
    },
    /// No money moved and no booking call was made.
    PaymentFailed { reason: String },
    /// The payment went through but the backend refused the booking.
    /// The payment identified by `merchant_uid` is not reversed by the client.
    Rejected {
        kind: RejectionKind,
        message: String,
        merchant_uid: String,
    },
    /// The user answered "no" at the confirmation gate.
    Declined,
}

/// A slot the user picked from the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSelection {
    pub key: SlotKey,
    pub status: SlotStatus,
    pub space_name: Option<String>,
}

impl SlotSelection {
    pub fn new(space_id: SpaceId, date: NaiveDate, slot: &Slot) -> Self {
        Self {
            key: SlotKey::new(space_id, date, &slot.time),
            status: slot.status,
            space_name: None,
        }
    }

    pub fn with_space_name(mut self, name: impl Into<String>) -> Self {
        self.space_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentResult {
    Succeeded,
    Failed,
    Abandoned,
}

/// Client-only record of one payment round-trip; dropped when the attempt ends.
#[derive(Debug, Clone)]
struct PaymentAttempt {
    merchant_uid: String,
    amount: i64,
    result: PaymentResult,
}

impl PaymentAttempt {
    fn new(outcome: &PaymentOutcome, amount: i64) -> Self {
        let result = match outcome {
            PaymentOutcome::Succeeded { .. } => PaymentResult::Succeeded,
            PaymentOutcome::Failed { .. } => PaymentResult::Failed,
            PaymentOutcome::Abandoned { .. } => PaymentResult::Abandoned,
        };
        Self {
            merchant_uid: outcome.merchant_uid().to_string(),
            amount,
            result,
        }
    }
}

/// Slots whose action control is disabled because an attempt is running.
#[derive(Debug, Clone, Default)]
pub struct InFlightSlots {
    slots: Arc<Mutex<HashSet<SlotKey>>>,
}

impl InFlightSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SlotKey>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.lock().contains(key)
    }

    /// Claims `key` until the returned guard is dropped; `None` if already claimed.
    pub fn try_claim(&self, key: &SlotKey) -> Option<InFlightGuard> {
        if self.lock().insert(key.clone()) {
            Some(InFlightGuard {
                slots: self.clone(),
                key: key.clone(),
            })
        } else {
            None
        }
    }
}

/// Re-enables the slot control when dropped, including when the attempt is abandoned.
#[derive(Debug)]
pub struct InFlightGuard {
    slots: InFlightSlots,
    key: SlotKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.slots.lock().remove(&self.key);
    }
}

/// Amount and slot length used for every attempt.
#[derive(Debug, Clone, Copy)]
pub struct BookingSettings {
    pub slot_duration: Duration,
    pub unit_amount: i64,
}

impl BookingSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            slot_duration: Duration::minutes(config.booking.slot_duration_minutes),
            unit_amount: config.payment.as_ref().map_or(0, |p| p.unit_amount),
        }
    }
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            slot_duration: Duration::hours(1),
            unit_amount: 0,
        }
    }
}

pub struct BookingOrchestrator {
    backend: Arc<dyn ReservationBackend>,
    payments: Arc<dyn PaymentGateway>,
    gate: Arc<dyn ConfirmationGate>,
    notifier: Arc<dyn Notifier>,
    cache_manager: CacheConsistencyManager,
    in_flight: InFlightSlots,
    states: Mutex<HashMap<SlotKey, AttemptState>>,
    settings: BookingSettings,
}

impl BookingOrchestrator {
    pub fn new(
        backend: Arc<dyn ReservationBackend>,
        payments: Arc<dyn PaymentGateway>,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
        cache_manager: CacheConsistencyManager,
        settings: BookingSettings,
    ) -> Self {
        Self {
            backend,
            payments,
            gate,
            notifier,
            cache_manager,
            in_flight: InFlightSlots::new(),
            states: Mutex::new(HashMap::new()),
            settings,
        }
    }

    /// Slot length used to derive end times; the availability view disables slots
    /// whose end cannot be derived with it.
    pub fn slot_duration(&self) -> Duration {
        self.settings.slot_duration
    }

    /// The in-flight set, shared with the availability view so it can disable controls.
    pub fn in_flight(&self) -> InFlightSlots {
        self.in_flight.clone()
    }

    /// Where the attempt for `key` currently is.
    pub fn state(&self, key: &SlotKey) -> AttemptState {
        self.lock_states()
            .get(key)
            .copied()
            .unwrap_or(AttemptState::Idle)
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<SlotKey, AttemptState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, key: &SlotKey, next: AttemptState) {
        let previous = self.lock_states().insert(key.clone(), next);
        info!(
            "attempt for {}: {} -> {}",
            key,
            previous.unwrap_or(AttemptState::Idle),
            next
        );
    }

    fn reset(&self, key: &SlotKey) {
        self.lock_states().remove(key);
        info!("attempt for {}: back to {}", key, AttemptState::Idle);
    }

    /// Runs one booking attempt for `selection` to its terminal state.
    ///
    /// Returns `Err` only for refusals that happen before any payment is requested:
    /// the slot is not AVAILABLE, an attempt for it is already running, or its end time
    /// cannot be derived.
    pub async fn select_slot(
        &self,
        selection: SlotSelection,
    ) -> Result<AttemptOutcome, BookingError> {
        let key = selection.key.clone();
        if selection.status != SlotStatus::Available {
            return Err(BookingError::SlotNotSelectable {
                slot: key,
                status: selection.status,
            });
        }
        if self.in_flight.contains(&key) {
            return Err(BookingError::AttemptInFlight(key));
        }
        let booking_request =
            CreateBookingRequest::for_slot(&key, self.settings.slot_duration)?;

        let prompt = format!(
            "Book {} on {} at {} and pay {}?",
            booking_label(&selection),
            key.date,
            key.time,
            self.settings.unit_amount
        );
        if !self.gate.confirm(&prompt).await {
            self.notifier
                .notify(Notice::new(NoticeKind::Info, "Booking was not started."));
            return Ok(AttemptOutcome::Declined);
        }

        let _guard = self
            .in_flight
            .try_claim(&key)
            .ok_or_else(|| BookingError::AttemptInFlight(key.clone()))?;

        self.transition(&key, AttemptState::PaymentInFlight);
        let payment = self
            .payments
            .initiate(PaymentRequest {
                space_id: key.space_id,
                space_name: selection.space_name.clone(),
                date: key.date,
                time: key.time.clone(),
                amount: self.settings.unit_amount,
            })
            .await;

        let attempt = match payment {
            Ok(outcome) if outcome.succeeded() => {
                PaymentAttempt::new(&outcome, self.settings.unit_amount)
            }
            Ok(outcome) => {
                let attempt = PaymentAttempt::new(&outcome, self.settings.unit_amount);
                let reason = outcome.reason().unwrap_or("payment failed").to_string();
                warn!(
                    "payment {} ({:?}) for {}: {}",
                    attempt.merchant_uid, attempt.result, key, reason
                );
                return Ok(self.payment_failed(&key, reason));
            }
            Err(e) => {
                warn!("payment for {} could not start: {}", key, e);
                return Ok(self.payment_failed(&key, e.to_string()));
            }
        };

        self.transition(&key, AttemptState::PaymentSucceeded);
        self.transition(&key, AttemptState::BookingRequested);
        let outcome = match self.backend.create_booking(booking_request).await {
            Ok(booking) => {
                self.transition(&key, AttemptState::BookingConfirmed);
                self.cache_manager.booking_confirmed(key.space_id, key.date);
                self.notifier.notify(Notice::new(
                    NoticeKind::Success,
                    format!(
                        "Booked {} on {} at {}.",
                        booking_label(&selection),
                        key.date,
                        key.time
                    ),
                ));
                AttemptOutcome::Confirmed {
                    booking,
                    merchant_uid: attempt.merchant_uid,
                }
            }
            Err(e) => {
                self.transition(&key, AttemptState::BookingRejected);
                let kind = RejectionKind::from(&e);
                let message = e.to_string();
                error!(
                    "payment {} of {} captured but booking for {} was not created: {}",
                    attempt.merchant_uid, attempt.amount, key, message
                );
                self.notifier.notify(rejection_notice(kind, &message, &attempt.merchant_uid));
                AttemptOutcome::Rejected {
                    kind,
                    message,
                    merchant_uid: attempt.merchant_uid,
                }
            }
        };
        self.reset(&key);
        Ok(outcome)
    }

    fn payment_failed(&self, key: &SlotKey, reason: String) -> AttemptOutcome {
        self.transition(key, AttemptState::PaymentFailed);
        self.notifier.notify(Notice::new(
            NoticeKind::Failure,
            format!("Payment did not go through: {}", reason),
        ));
        self.reset(key);
        AttemptOutcome::PaymentFailed { reason }
    }
}

fn booking_label(selection: &SlotSelection) -> String {
    selection
        .space_name
        .clone()
        .unwrap_or_else(|| format!("space {}", selection.key.space_id))
}

fn rejection_notice(kind: RejectionKind, message: &str, merchant_uid: &str) -> Notice {
    match kind {
        RejectionKind::Conflict => Notice::new(
            NoticeKind::Conflict,
            format!(
                "This slot is already taken. Payment {} was charged but not booked; \
                 contact support for a refund.",
                merchant_uid
            ),
        ),
        _ => Notice::new(
            NoticeKind::PaymentUnreconciled,
            format!(
                "Payment {} was charged but the booking failed: {}",
                merchant_uid, message
            ),
        ),
    }
}
