// --- File: crates/seatpick_common/src/models.rs ---

// Wire and domain types shared by the API client, the payment adapter and the
// booking workflow. Field names follow the reservation backend's JSON (camelCase).

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{validation_error, SeatpickError};

const SECONDS_PER_DAY: i64 = 86_400;

pub type SpaceId = i64;
pub type BookingId = i64;

/// A bookable space. Reference data owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    /// Category tag, e.g. `MEETING_ROOM`.
    #[serde(rename = "type", default)]
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Booked,
    Locked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Booked => "BOOKED",
            SlotStatus::Locked => "LOCKED",
        };
        f.write_str(label)
    }
}

/// One entry of `GET /spaces/{id}/slots?date=...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// `HH:MM` or `HH:MM:SS`, as sent by the backend.
    pub time: String,
    pub status: SlotStatus,
}

impl Slot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    /// The slot time trimmed to `HH:MM`.
    pub fn label(&self) -> &str {
        clock_label(&self.time)
    }
}

/// Coordinates of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub space_id: SpaceId,
    pub date: NaiveDate,
    /// Always normalised to `HH:MM`.
    pub time: String,
}

impl SlotKey {
    pub fn new(space_id: SpaceId, date: NaiveDate, time: &str) -> Self {
        Self {
            space_id,
            date,
            time: clock_label(time).to_string(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "space {} on {} at {}", self.space_id, self.date, self.time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// CANCELLED and COMPLETED bookings can no longer change from the client side.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

/// A reservation as returned by `POST /bookings` and `GET /bookings/my`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    #[serde(default)]
    pub space_id: Option<SpaceId>,
    #[serde(default)]
    pub space_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub space_id: SpaceId,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

impl CreateBookingRequest {
    /// Builds the request for `slot`, deriving the end time from the fixed slot length.
    ///
    /// A slot ending exactly at midnight ends at `24:00` on its own date; one that would
    /// run into the next day is refused.
    pub fn for_slot(slot: &SlotKey, slot_duration: Duration) -> Result<Self, SeatpickError> {
        let start = parse_clock(&slot.time)?;
        let (end, wrapped) = start.overflowing_add_signed(slot_duration);
        let end_time = match wrapped {
            0 => end.format("%H:%M").to_string(),
            SECONDS_PER_DAY if Some(end) == NaiveTime::from_hms_opt(0, 0, 0) => {
                "24:00".to_string()
            }
            _ => {
                return Err(validation_error(format!(
                    "slot {} would end after midnight",
                    slot.time
                )))
            }
        };
        Ok(Self {
            space_id: slot.space_id,
            date: slot.date,
            start_time: start.format("%H:%M").to_string(),
            end_time,
        })
    }
}

/// Trims `HH:MM:SS` to `HH:MM`; shorter strings are returned as is.
pub fn clock_label(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_clock(time: &str) -> Result<NaiveTime, SeatpickError> {
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|e| SeatpickError::ParseError(format!("invalid time '{}': {}", time, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    #[test]
    fn test_slot_statuses_deserialize_from_backend_casing() {
        let slots: Vec<Slot> = serde_json::from_str(
            r#"[{"time":"14:00:00","status":"AVAILABLE"},{"time":"15:00","status":"LOCKED"}]"#,
        )
        .unwrap();
        assert!(slots[0].is_available());
        assert_eq!(slots[0].label(), "14:00");
        assert_eq!(slots[1].status, SlotStatus::Locked);
    }

    #[test]
    fn test_create_booking_request_derives_one_hour_end() {
        let key = SlotKey::new(1, date(), "14:00:00");
        let request = CreateBookingRequest::for_slot(&key, Duration::hours(1)).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "spaceId": 1,
                "date": "2026-02-02",
                "startTime": "14:00",
                "endTime": "15:00"
            })
        );
    }

    #[test]
    fn test_last_slot_of_the_day_ends_at_twenty_four() {
        let key = SlotKey::new(1, date(), "23:00:00");
        let request = CreateBookingRequest::for_slot(&key, Duration::hours(1)).unwrap();
        assert_eq!(request.start_time, "23:00");
        assert_eq!(request.end_time, "24:00");
        assert_eq!(request.date, date());
    }

    #[test]
    fn test_create_booking_request_rejects_slot_crossing_midnight() {
        let key = SlotKey::new(1, date(), "23:30");
        assert!(matches!(
            CreateBookingRequest::for_slot(&key, Duration::hours(1)),
            Err(SeatpickError::ValidationError(_))
        ));
    }

    #[test]
    fn test_booking_parses_embedded_space_name() {
        let booking: Booking = serde_json::from_str(
            r#"{"id":7,"spaceName":"Room A","date":"2026-02-02","startTime":"14:00:00","endTime":"15:00:00","status":"CONFIRMED"}"#,
        )
        .unwrap();
        assert_eq!(booking.space_name.as_deref(), Some("Room A"));
        assert_eq!(booking.space_id, None);
        assert!(!booking.status.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
    }

    #[test]
    fn test_space_category_maps_type_field() {
        let space: Space = serde_json::from_str(
            r#"{"id":1,"name":"Room A","location":"Seoul","type":"MEETING_ROOM"}"#,
        )
        .unwrap();
        assert_eq!(space.category, "MEETING_ROOM");
    }
}
