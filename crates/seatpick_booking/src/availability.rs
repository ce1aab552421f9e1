//! The slot grid for one space and one date.

use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::debug;

use seatpick_common::models::{CreateBookingRequest, Slot, SlotKey, SlotStatus, SpaceId};
use seatpick_common::services::ReservationBackend;
use seatpick_common::SeatpickError;

use crate::cache::{CacheKey, CachedData, ViewCache};
use crate::orchestrator::{InFlightSlots, SlotSelection};

/// One cell of the rendered grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    /// `HH:MM`
    pub time: String,
    pub status: SlotStatus,
    /// Whether the action control for this slot is enabled.
    pub selectable: bool,
}

pub struct AvailabilityViewModel {
    backend: Arc<dyn ReservationBackend>,
    cache: Arc<ViewCache>,
    in_flight: InFlightSlots,
    space_id: SpaceId,
    space_name: Option<String>,
    date: NaiveDate,
    slot_duration: Duration,
}

impl AvailabilityViewModel {
    pub fn new(
        backend: Arc<dyn ReservationBackend>,
        cache: Arc<ViewCache>,
        in_flight: InFlightSlots,
        space_id: SpaceId,
        date: NaiveDate,
    ) -> Self {
        Self {
            backend,
            cache,
            in_flight,
            space_id,
            space_name: None,
            date,
            slot_duration: Duration::hours(1),
        }
    }

    /// Length of one slot; must match the orchestrator's so both agree on bookable slots.
    pub fn with_slot_duration(mut self, slot_duration: Duration) -> Self {
        self.slot_duration = slot_duration;
        self
    }

    pub fn with_space_name(mut self, name: impl Into<String>) -> Self {
        self.space_name = Some(name.into());
        self
    }

    pub fn space_id(&self) -> SpaceId {
        self.space_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn next_day(&mut self) {
        self.date += Duration::days(1);
    }

    pub fn previous_day(&mut self) {
        self.date -= Duration::days(1);
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::Slots {
            space_id: self.space_id,
            date: self.date,
        }
    }

    /// Slots for the current date, refetched when the cached copy is missing or stale.
    pub async fn slots(&self) -> Result<Vec<Slot>, SeatpickError> {
        let key = self.key();
        if let Some(CachedData::Slots(slots)) = self.cache.fresh(&key) {
            return Ok(slots);
        }
        debug!("fetching slots for space {} on {}", self.space_id, self.date);
        let ticket = self.cache.begin_fetch(&key);
        let slots = self.backend.list_slots(self.space_id, self.date).await?;
        self.cache.store(key, CachedData::Slots(slots.clone()), ticket);
        Ok(slots)
    }

    /// The grid as it should be drawn: only AVAILABLE slots without a running attempt
    /// are selectable. A slot whose end time would run into the next day is drawn disabled.
    pub async fn render(&self) -> Result<Vec<SlotView>, SeatpickError> {
        let slots = self.slots().await?;
        Ok(slots
            .iter()
            .map(|slot| {
                let key = SlotKey::new(self.space_id, self.date, &slot.time);
                SlotView {
                    time: slot.label().to_string(),
                    status: slot.status,
                    selectable: slot.is_available()
                        && !self.in_flight.contains(&key)
                        && CreateBookingRequest::for_slot(&key, self.slot_duration).is_ok(),
                }
            })
            .collect())
    }

    /// Selection for `slot` as shown on this grid.
    pub fn select(&self, slot: &Slot) -> SlotSelection {
        let selection = SlotSelection::new(self.space_id, self.date, slot);
        match &self.space_name {
            Some(name) => selection.with_space_name(name.clone()),
            None => selection,
        }
    }

    /// Looks up `time` (`HH:MM` or `HH:MM:SS`) on the current grid.
    pub async fn find(&self, time: &str) -> Result<Option<Slot>, SeatpickError> {
        let wanted = SlotKey::new(self.space_id, self.date, time);
        Ok(self
            .slots()
            .await?
            .into_iter()
            .find(|slot| slot.label() == wanted.time))
    }
}
