// --- File: crates/seatpick_common/src/services.rs ---
//! Service abstractions for the collaborators of the booking workflow.
//!
//! These traits allow for dependency injection and easier testing by decoupling the
//! workflow from the HTTP backend, the payment widget and the user interface.

use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;

use crate::error::SeatpickError;
use crate::models::{Booking, BookingId, CreateBookingRequest, Slot, Space, SpaceId};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A boxed future without an error channel.
pub type BoxFutureValue<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations offered by the reservation backend.
///
/// The backend is the only authority on booking legality; implementations report its
/// verdicts as [`SeatpickError`] variants (conflicts as `ConflictError`).
pub trait ReservationBackend: Send + Sync {
    /// `GET /spaces`
    fn list_spaces(&self) -> BoxFuture<'_, Vec<Space>, SeatpickError>;

    /// `GET /spaces/{id}`
    fn get_space(&self, space_id: SpaceId) -> BoxFuture<'_, Space, SeatpickError>;

    /// `GET /spaces/{id}/slots?date=YYYY-MM-DD`
    fn list_slots(&self, space_id: SpaceId, date: NaiveDate)
        -> BoxFuture<'_, Vec<Slot>, SeatpickError>;

    /// `POST /bookings`
    fn create_booking(&self, request: CreateBookingRequest)
        -> BoxFuture<'_, Booking, SeatpickError>;

    /// `POST /bookings/{id}/cancel`
    fn cancel_booking(&self, booking_id: BookingId) -> BoxFuture<'_, (), SeatpickError>;

    /// `GET /bookings/my`
    fn my_bookings(&self) -> BoxFuture<'_, Vec<Booking>, SeatpickError>;

    /// `POST /users/upgrade`
    fn upgrade_account(&self) -> BoxFuture<'_, (), SeatpickError>;
}

/// What is being paid for.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub space_id: SpaceId,
    pub space_name: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    /// Smallest currency unit.
    pub amount: i64,
}

/// The single resolved result of one payment round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded {
        merchant_uid: String,
        provider_transaction_id: Option<String>,
    },
    Failed {
        merchant_uid: String,
        reason: String,
    },
    /// The gateway dropped the attempt without ever calling back.
    Abandoned { merchant_uid: String },
}

impl PaymentOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, PaymentOutcome::Succeeded { .. })
    }

    pub fn merchant_uid(&self) -> &str {
        match self {
            PaymentOutcome::Succeeded { merchant_uid, .. }
            | PaymentOutcome::Failed { merchant_uid, .. }
            | PaymentOutcome::Abandoned { merchant_uid } => merchant_uid,
        }
    }

    /// Why the payment did not go through; `None` on success.
    pub fn reason(&self) -> Option<&str> {
        match self {
            PaymentOutcome::Succeeded { .. } => None,
            PaymentOutcome::Failed { reason, .. } => Some(reason),
            PaymentOutcome::Abandoned { .. } => Some("payment was abandoned"),
        }
    }
}

/// A payment gateway that turns one user action into one [`PaymentOutcome`].
///
/// An `Err` means the gateway could not be invoked at all (e.g. the module is unavailable).
pub trait PaymentGateway: Send + Sync {
    fn initiate(&self, request: PaymentRequest) -> BoxFuture<'_, PaymentOutcome, SeatpickError>;
}

/// A blocking yes/no question put to the user before an irreversible step.
pub trait ConfirmationGate: Send + Sync {
    fn confirm<'a>(&'a self, prompt: &'a str) -> BoxFutureValue<'a, bool>;
}

/// Confirms everything; used for non-interactive runs.
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm<'a>(&'a self, _prompt: &'a str) -> BoxFutureValue<'a, bool> {
        Box::pin(async { true })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    /// The backend refused because someone else got there first.
    Conflict,
    /// Money moved but the booking does not exist.
    PaymentUnreconciled,
    Failure,
    Info,
}

/// A user-visible acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Where acknowledgments are shown to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
