// --- File: crates/seatpick_booking/src/lib.rs ---

pub mod api;
pub mod availability;
pub mod booking_list;
pub mod cache;
pub mod cancellation;
pub mod error;
pub mod orchestrator;
pub mod spaces;

pub use api::HttpReservationBackend;
pub use availability::{AvailabilityViewModel, SlotView};
pub use booking_list::{BookingListViewModel, BookingRow};
pub use cache::{CacheConsistencyManager, CacheKey, CachedData, ViewCache};
pub use cancellation::{CancelOutcome, CancellationFlow};
pub use error::BookingError;
pub use orchestrator::{
    AttemptOutcome, AttemptState, BookingOrchestrator, BookingSettings, InFlightGuard,
    InFlightSlots, RejectionKind, SlotSelection,
};
pub use spaces::SpaceDirectory;
