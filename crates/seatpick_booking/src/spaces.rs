use std::sync::Arc;

use seatpick_common::models::{Space, SpaceId};
use seatpick_common::services::ReservationBackend;
use seatpick_common::SeatpickError;

use crate::cache::{CacheKey, CachedData, ViewCache};

/// Read-only access to the space reference data.
pub struct SpaceDirectory {
    backend: Arc<dyn ReservationBackend>,
    cache: Arc<ViewCache>,
}

impl SpaceDirectory {
    pub fn new(backend: Arc<dyn ReservationBackend>, cache: Arc<ViewCache>) -> Self {
        Self { backend, cache }
    }

    pub async fn list(&self) -> Result<Vec<Space>, SeatpickError> {
        if let Some(CachedData::Spaces(spaces)) = self.cache.fresh(&CacheKey::Spaces) {
            return Ok(spaces);
        }
        let ticket = self.cache.begin_fetch(&CacheKey::Spaces);
        let spaces = self.backend.list_spaces().await?;
        self.cache
            .store(CacheKey::Spaces, CachedData::Spaces(spaces.clone()), ticket);
        Ok(spaces)
    }

    pub async fn get(&self, space_id: SpaceId) -> Result<Space, SeatpickError> {
        let key = CacheKey::Space(space_id);
        if let Some(CachedData::Space(space)) = self.cache.fresh(&key) {
            return Ok(space);
        }
        let ticket = self.cache.begin_fetch(&key);
        let space = self.backend.get_space(space_id).await?;
        self.cache.store(key, CachedData::Space(space.clone()), ticket);
        Ok(space)
    }
}
