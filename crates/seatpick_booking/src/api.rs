//! [`ReservationBackend`] over the shared [`ApiClient`].

use chrono::NaiveDate;
use tracing::info;

use seatpick_common::log_result;
use seatpick_common::models::{Booking, BookingId, CreateBookingRequest, Slot, Space, SpaceId};
use seatpick_common::services::{BoxFuture, ReservationBackend};
use seatpick_common::{ApiClient, SeatpickError};

pub struct HttpReservationBackend {
    client: ApiClient,
}

impl HttpReservationBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl ReservationBackend for HttpReservationBackend {
    fn list_spaces(&self) -> BoxFuture<'_, Vec<Space>, SeatpickError> {
        Box::pin(async move { self.client.get_json::<Vec<Space>>("/spaces", &[]).await })
    }

    fn get_space(&self, space_id: SpaceId) -> BoxFuture<'_, Space, SeatpickError> {
        Box::pin(async move {
            self.client
                .get_json::<Space>(&format!("/spaces/{}", space_id), &[])
                .await
        })
    }

    fn list_slots(
        &self,
        space_id: SpaceId,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Slot>, SeatpickError> {
        Box::pin(async move {
            let query = [("date", date.format("%Y-%m-%d").to_string())];
            self.client
                .get_json::<Vec<Slot>>(&format!("/spaces/{}/slots", space_id), &query)
                .await
        })
    }

    fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> BoxFuture<'_, Booking, SeatpickError> {
        Box::pin(async move {
            info!(
                "creating booking for space {} on {} {}-{}",
                request.space_id, request.date, request.start_time, request.end_time
            );
            let result = self.client.post_json::<_, Booking>("/bookings", &request).await;
            log_result(result, "booking created", "booking creation failed")
        })
    }

    fn cancel_booking(&self, booking_id: BookingId) -> BoxFuture<'_, (), SeatpickError> {
        Box::pin(async move {
            let result = self
                .client
                .post_empty(&format!("/bookings/{}/cancel", booking_id))
                .await;
            log_result(result, "booking cancelled", "booking cancellation failed")
        })
    }

    fn my_bookings(&self) -> BoxFuture<'_, Vec<Booking>, SeatpickError> {
        Box::pin(async move { self.client.get_json::<Vec<Booking>>("/bookings/my", &[]).await })
    }

    fn upgrade_account(&self) -> BoxFuture<'_, (), SeatpickError> {
        Box::pin(async move {
            let result = self.client.post_empty("/users/upgrade").await;
            log_result(result, "account upgraded", "account upgrade failed")
        })
    }
}
