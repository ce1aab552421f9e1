//! The local view cache and the component allowed to invalidate it.
//!
//! Entries are keyed by what was asked for. Writes elsewhere never patch an entry;
//! they only mark it stale, and the owning view model refetches on its next read.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use seatpick_common::models::{Booking, Slot, Space, SpaceId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Spaces,
    Space(SpaceId),
    Slots { space_id: SpaceId, date: NaiveDate },
    MyBookings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedData {
    Spaces(Vec<Space>),
    Space(Space),
    Slots(Vec<Slot>),
    Bookings(Vec<Booking>),
}

#[derive(Debug)]
struct CacheEntry {
    data: CachedData,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    // Bumped on every invalidation; a fetch that started before the bump stores stale data.
    generations: HashMap<CacheKey, u64>,
}

/// Token handed out when a refetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
pub struct ViewCache {
    state: Mutex<CacheState>,
}

impl ViewCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Data for `key` unless it is missing or stale.
    pub fn fresh(&self, key: &CacheKey) -> Option<CachedData> {
        self.lock()
            .entries
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.data.clone())
    }

    /// Data for `key` whether stale or not.
    pub fn peek(&self, key: &CacheKey) -> Option<CachedData> {
        self.lock().entries.get(key).map(|entry| entry.data.clone())
    }

    /// True when the next read of `key` has to go to the backend.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.lock().entries.get(key).map_or(true, |entry| entry.stale)
    }

    pub(crate) fn begin_fetch(&self, key: &CacheKey) -> FetchTicket {
        FetchTicket(self.lock().generations.get(key).copied().unwrap_or(0))
    }

    /// Replaces the entry with refetched data. If the key was invalidated while the fetch
    /// was running, the new entry stays stale.
    pub(crate) fn store(&self, key: CacheKey, data: CachedData, ticket: FetchTicket) {
        let mut state = self.lock();
        let current = state.generations.get(&key).copied().unwrap_or(0);
        let stale = current != ticket.0;
        debug!("cache store {:?} (stale: {})", key, stale);
        state.entries.insert(key, CacheEntry { data, stale });
    }

    pub(crate) fn mark_stale(&self, key: &CacheKey) {
        let mut state = self.lock();
        *state.generations.entry(key.clone()).or_insert(0) += 1;
        if let Some(entry) = state.entries.get_mut(key) {
            entry.stale = true;
        }
        debug!("cache invalidated {:?}", key);
    }
}

/// Marks dependent views stale after a state-changing operation commits.
#[derive(Debug, Clone)]
pub struct CacheConsistencyManager {
    cache: Arc<ViewCache>,
}

impl CacheConsistencyManager {
    pub fn new(cache: Arc<ViewCache>) -> Self {
        Self { cache }
    }

    /// A booking was created: the slot grid it came from and the booking list change.
    pub fn booking_confirmed(&self, space_id: SpaceId, date: NaiveDate) {
        self.cache.mark_stale(&CacheKey::Slots { space_id, date });
        self.cache.mark_stale(&CacheKey::MyBookings);
    }

    /// A booking was cancelled. Only the booking list is invalidated; the slot grid keeps
    /// showing BOOKED until it is refreshed on its own.
    pub fn booking_cancelled(&self) {
        self.cache.mark_stale(&CacheKey::MyBookings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatpick_common::models::SlotStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    fn slots_key() -> CacheKey {
        CacheKey::Slots {
            space_id: 1,
            date: date(),
        }
    }

    fn slots(status: SlotStatus) -> CachedData {
        CachedData::Slots(vec![Slot {
            time: "14:00".into(),
            status,
        }])
    }

    #[test]
    fn test_store_then_read_is_fresh() {
        let cache = ViewCache::new();
        assert!(cache.is_stale(&slots_key()));

        let ticket = cache.begin_fetch(&slots_key());
        cache.store(slots_key(), slots(SlotStatus::Available), ticket);

        assert!(!cache.is_stale(&slots_key()));
        assert_eq!(cache.fresh(&slots_key()), Some(slots(SlotStatus::Available)));
    }

    #[test]
    fn test_booking_confirmed_invalidates_slots_and_bookings() {
        let cache = ViewCache::new();
        let manager = CacheConsistencyManager::new(cache.clone());
        let ticket = cache.begin_fetch(&slots_key());
        cache.store(slots_key(), slots(SlotStatus::Available), ticket);
        let ticket = cache.begin_fetch(&CacheKey::MyBookings);
        cache.store(CacheKey::MyBookings, CachedData::Bookings(vec![]), ticket);

        manager.booking_confirmed(1, date());

        assert!(cache.fresh(&slots_key()).is_none());
        assert!(cache.fresh(&CacheKey::MyBookings).is_none());
        // The stale copy is kept as is, never patched.
        assert_eq!(cache.peek(&slots_key()), Some(slots(SlotStatus::Available)));
    }

    #[test]
    fn test_booking_cancelled_leaves_slot_grid_alone() {
        let cache = ViewCache::new();
        let manager = CacheConsistencyManager::new(cache.clone());
        let ticket = cache.begin_fetch(&slots_key());
        cache.store(slots_key(), slots(SlotStatus::Booked), ticket);
        let ticket = cache.begin_fetch(&CacheKey::MyBookings);
        cache.store(CacheKey::MyBookings, CachedData::Bookings(vec![]), ticket);

        manager.booking_cancelled();

        assert!(!cache.is_stale(&slots_key()));
        assert!(cache.is_stale(&CacheKey::MyBookings));
    }

    #[test]
    fn test_invalidation_during_fetch_keeps_entry_stale() {
        let cache = ViewCache::new();
        let manager = CacheConsistencyManager::new(cache.clone());

        let ticket = cache.begin_fetch(&slots_key());
        manager.booking_confirmed(1, date());
        cache.store(slots_key(), slots(SlotStatus::Available), ticket);

        assert!(cache.is_stale(&slots_key()));
    }

    #[test]
    fn test_other_dates_are_untouched() {
        let cache = ViewCache::new();
        let manager = CacheConsistencyManager::new(cache.clone());
        let other = CacheKey::Slots {
            space_id: 1,
            date: date().succ_opt().unwrap(),
        };
        let ticket = cache.begin_fetch(&other);
        cache.store(other.clone(), slots(SlotStatus::Available), ticket);

        manager.booking_confirmed(1, date());

        assert!(!cache.is_stale(&other));
    }
}
