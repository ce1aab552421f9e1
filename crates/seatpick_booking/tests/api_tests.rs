//! `HttpReservationBackend` against a mocked reservation backend.

use chrono::NaiveDate;
use seatpick_booking::HttpReservationBackend;
use seatpick_common::models::{BookingStatus, CreateBookingRequest, SlotKey, SlotStatus};
use seatpick_common::services::ReservationBackend;
use seatpick_common::{ApiClient, Credentials, SeatpickError, SessionContext};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpReservationBackend {
    let session = SessionContext::in_memory();
    session
        .capture(Credentials {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
        })
        .unwrap();
    HttpReservationBackend::new(ApiClient::new(
        format!("{}/api", server.uri()),
        Arc::new(session),
    ))
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
}

fn fourteen_hundred() -> CreateBookingRequest {
    let key = SlotKey::new(1, date(), "14:00");
    CreateBookingRequest::for_slot(&key, chrono::Duration::hours(1)).unwrap()
}

#[tokio::test]
async fn test_list_slots_sends_date_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spaces/1/slots"))
        .and(query_param("date", "2026-02-02"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"time": "13:00:00", "status": "AVAILABLE"},
            {"time": "14:00:00", "status": "BOOKED"},
            {"time": "15:00:00", "status": "LOCKED"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let slots = backend_for(&server).list_slots(1, date()).await.unwrap();

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].label(), "13:00");
    assert_eq!(slots[1].status, SlotStatus::Booked);
    assert_eq!(slots[2].status, SlotStatus::Locked);
}

#[tokio::test]
async fn test_create_booking_posts_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .and(body_json(json!({
            "spaceId": 1,
            "date": "2026-02-02",
            "startTime": "14:00",
            "endTime": "15:00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 77,
            "spaceId": 1,
            "spaceName": "Room A",
            "date": "2026-02-02",
            "startTime": "14:00:00",
            "endTime": "15:00:00",
            "status": "CONFIRMED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = fourteen_hundred();
    let booking = backend_for(&server).create_booking(request).await.unwrap();

    assert_eq!(booking.id, 77);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.space_name.as_deref(), Some("Room A"));
}

#[tokio::test]
async fn test_create_booking_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "already reserved"})),
        )
        .mount(&server)
        .await;

    let request = fourteen_hundred();
    let err = backend_for(&server).create_booking(request).await.unwrap_err();

    assert!(matches!(err, SeatpickError::ConflictError(ref m) if m == "already reserved"));
}

#[tokio::test]
async fn test_cancel_and_my_bookings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings/77/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 77,
            "spaceName": "Room A",
            "date": "2026-02-02",
            "startTime": "14:00:00",
            "endTime": "15:00:00",
            "status": "CANCELLED"
        }])))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    backend.cancel_booking(77).await.unwrap();
    let bookings = backend.my_bookings().await.unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].space_id, None);
    assert_eq!(bookings[0].status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_spaces_and_upgrade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Room A", "location": "2F", "type": "MEETING_ROOM"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/spaces/2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no such space"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/upgrade"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let spaces = backend.list_spaces().await.unwrap();
    assert_eq!(spaces[0].category, "MEETING_ROOM");
    assert!(matches!(
        backend.get_space(2).await,
        Err(SeatpickError::NotFoundError(_))
    ));
    backend.upgrade_account().await.unwrap();
}
