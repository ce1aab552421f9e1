use std::sync::Arc;
use tracing::debug;

use seatpick_common::models::{clock_label, Booking, BookingId, BookingStatus};
use seatpick_common::services::ReservationBackend;
use seatpick_common::SeatpickError;

use crate::cache::{CacheKey, CachedData, ViewCache};

/// One line of the "my bookings" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRow {
    pub id: BookingId,
    pub space_name: String,
    pub date: String,
    /// `HH:MM ~ HH:MM`
    pub time_range: String,
    pub status: BookingStatus,
    pub cancellable: bool,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        let space_name = match (&booking.space_name, booking.space_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("space {}", id),
            (None, None) => "unknown space".to_string(),
        };
        Self {
            id: booking.id,
            space_name,
            date: booking.date.format("%Y-%m-%d").to_string(),
            time_range: format!(
                "{} ~ {}",
                clock_label(&booking.start_time),
                clock_label(&booking.end_time)
            ),
            status: booking.status,
            cancellable: !booking.status.is_terminal(),
        }
    }
}

pub struct BookingListViewModel {
    backend: Arc<dyn ReservationBackend>,
    cache: Arc<ViewCache>,
}

impl BookingListViewModel {
    pub fn new(backend: Arc<dyn ReservationBackend>, cache: Arc<ViewCache>) -> Self {
        Self { backend, cache }
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>, SeatpickError> {
        let key = CacheKey::MyBookings;
        if let Some(CachedData::Bookings(bookings)) = self.cache.fresh(&key) {
            return Ok(bookings);
        }
        debug!("fetching my bookings");
        let ticket = self.cache.begin_fetch(&key);
        let bookings = self.backend.my_bookings().await?;
        self.cache
            .store(key, CachedData::Bookings(bookings.clone()), ticket);
        Ok(bookings)
    }

    pub async fn rows(&self) -> Result<Vec<BookingRow>, SeatpickError> {
        Ok(self.bookings().await?.iter().map(BookingRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: 7,
            space_id: Some(1),
            space_name: None,
            date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            start_time: "14:00:00".into(),
            end_time: "15:00:00".into(),
            status,
        }
    }

    #[test]
    fn test_row_formats_time_range() {
        let row = BookingRow::from(&booking(BookingStatus::Confirmed));
        assert_eq!(row.time_range, "14:00 ~ 15:00");
        assert_eq!(row.space_name, "space 1");
        assert_eq!(row.date, "2026-02-02");
        assert!(row.cancellable);
    }

    #[test]
    fn test_terminal_bookings_are_not_cancellable() {
        assert!(!BookingRow::from(&booking(BookingStatus::Cancelled)).cancellable);
        assert!(!BookingRow::from(&booking(BookingStatus::Completed)).cancellable);
        assert!(BookingRow::from(&booking(BookingStatus::Pending)).cancellable);
    }
}
