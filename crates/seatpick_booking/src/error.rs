use seatpick_common::models::{BookingId, BookingStatus, SlotKey, SlotStatus};
use seatpick_common::SeatpickError;
use thiserror::Error;

/// Refusals raised by the booking workflow before anything leaves the client,
/// plus backend failures passed through.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{slot} is {status} and cannot be selected")]
    SlotNotSelectable { slot: SlotKey, status: SlotStatus },

    #[error("an attempt for {0} is already in progress")]
    AttemptInFlight(SlotKey),

    #[error("booking {booking_id} is {status} and cannot be cancelled")]
    NotCancellable {
        booking_id: BookingId,
        status: BookingStatus,
    },

    #[error(transparent)]
    Backend(#[from] SeatpickError),
}

impl From<BookingError> for SeatpickError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Backend(e) => e,
            other @ BookingError::AttemptInFlight(_) => {
                SeatpickError::ConflictError(other.to_string())
            }
            other => SeatpickError::ValidationError(other.to_string()),
        }
    }
}
