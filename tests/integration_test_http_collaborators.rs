mod common;

use common::{filled_form, monday, venue};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use venue_booking::config::Config;
use venue_booking::domain::models::booking::SubmissionRejection;
use venue_booking::domain::models::time_slot::TimeSlot;
use venue_booking::domain::ports::{BookingSubmission, VenueDirectory};
use venue_booking::error::{AppError, BookingError, SubmissionFailure};
use venue_booking::infra::booking::http_booking_service::HttpBookingService;
use venue_booking::infra::factory::bootstrap_state;
use venue_booking::infra::venue_directory::http_venue_directory::HttpVenueDirectory;
use venue_booking::session::BookingFormSession;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn directory(server: &MockServer) -> HttpVenueDirectory {
    HttpVenueDirectory::new(server.uri(), Some("secret".to_string()), Duration::from_secs(5))
}

#[tokio::test]
async fn test_directory_reads_availability_with_date_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/availability"))
        .and(query_param("fecha", "2026-10-19"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanal": { "1": [9, "10"] },
            "fechaEspecifica": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = directory(&server).get_availability("manager-7", monday()).await.unwrap();
    assert!(raw.weekly.is_some());
    assert!(raw.date_specific.is_none());
}

#[tokio::test]
async fn test_directory_accepts_positional_weekly_template() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanal": [[], [9, 10], [], [], [], [], []],
            "fechaEspecifica": [[], [15, 16], [], [], [], [], []]
        })))
        .mount(&server)
        .await;

    let raw = directory(&server).get_availability("manager-7", monday()).await.unwrap();
    let template = venue_booking::domain::services::availability::normalize_availability(&raw, monday());
    let hours: Vec<u8> = template.open_hours(chrono::Weekday::Mon).iter().map(|h| h.hour).collect();
    assert_eq!(hours, vec![15, 16]);
    assert!(template.open_hours(chrono::Weekday::Sun).is_empty());
}

#[tokio::test]
async fn test_directory_bad_block_record_does_not_fail_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/blocked-slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hour": 10, "isRecurring": true, "day": 1 },
            { "hour": 11, "isRecurring": false, "date": 20261019 },
            { "hour": 12, "hora": 12, "isRecurring": false, "date": "2026-10-19" }
        ])))
        .mount(&server)
        .await;

    let blocked = directory(&server).get_blocked_slots("manager-7", monday()).await.unwrap();
    assert_eq!(blocked.len(), 3);
    let normalized = venue_booking::domain::services::block_filter::normalize_blocked(&blocked);
    assert_eq!(normalized.iter().map(|b| b.hour).collect::<Vec<_>>(), vec![10, 12]);
}

#[tokio::test]
async fn test_directory_client_timeout_is_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let dir = HttpVenueDirectory::new(server.uri(), None, Duration::from_secs(1));
    let err = dir.get_availability("manager-7", monday()).await.unwrap_err();
    assert_eq!(err, AppError::Timeout(1));
}

#[tokio::test]
async fn test_directory_null_block_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/blocked-slots"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null").insert_header("content-type", "application/json"))
        .mount(&server)
        .await;

    let blocked = directory(&server).get_blocked_slots("manager-7", monday()).await.unwrap();
    assert!(blocked.is_empty());
}

#[tokio::test]
async fn test_directory_capacity_accepts_string_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/venues/venue-42/capacity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "capacidad": "180" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/venues/venue-0/capacity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "capacidad": null })))
        .mount(&server)
        .await;

    let dir = directory(&server);
    assert_eq!(dir.get_venue_capacity("venue-42").await.unwrap(), Some(180));
    assert_eq!(dir.get_venue_capacity("venue-0").await.unwrap(), None);
}

#[tokio::test]
async fn test_directory_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = directory(&server).get_availability("manager-7", monday()).await.unwrap_err();
    assert_eq!(err, AppError::UpstreamStatus { status: 503, body: "maintenance".to_string() });
}

#[tokio::test]
async fn test_directory_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = directory(&server).get_blocked_slots("manager-7", monday()).await.unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
}

#[tokio::test]
async fn test_booking_service_rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solicitudes"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "null value in column \"titulo\"" })))
        .mount(&server)
        .await;

    let service = HttpBookingService::new(server.uri(), None, Duration::from_secs(5));
    let mut selection = venue_booking::domain::services::selection::SlotSelection::new();
    selection.toggle(TimeSlot::new(9).unwrap()).unwrap();
    let venue = venue();
    let ctx = venue_booking::domain::services::composer::BookingContext {
        venue: &venue,
        requester_id: "artist-1",
        date: monday(),
    };
    let request = venue_booking::domain::services::composer::compose(ctx, &filled_form(10), &selection).unwrap();

    let rejection = service.submit_booking_request(&request).await.unwrap_err();
    assert_eq!(
        rejection,
        SubmissionRejection::status(500, Some("null value in column \"titulo\"".to_string()))
    );
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let directory_server = MockServer::start().await;
    let booking_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/managers/manager-7/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanal": { "1": [9, 10, 11, 12] },
            "fechaEspecifica": null
        })))
        .mount(&directory_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/blocked-slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hour": 10, "isRecurring": true, "day": 1, "date": null }
        ])))
        .mount(&directory_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/venues/venue-42/capacity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "capacidad": 100 })))
        .mount(&directory_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/solicitudes"))
        .and(header_exists("X-Request-Id"))
        .and(body_partial_json(json!({
            "espacioId": "venue-42",
            "gestorId": "manager-7",
            "artistaId": "artist-1",
            "fecha": "2026-10-19",
            "horaInicio": "11:00:00",
            "horaFin": "13:00:00",
            "duracionHoras": 2,
            "asistentesEsperados": 150
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&booking_server)
        .await;

    let config = Config {
        venue_directory_url: directory_server.uri(),
        booking_service_url: booking_server.uri(),
        ..Config::default()
    };
    let state = Arc::new(bootstrap_state(&config).unwrap());
    let mut session = BookingFormSession::open_booking_form(state, venue(), "artist-1", monday()).await;

    let hours: Vec<u8> = session.slots().iter().map(TimeSlot::hour).collect();
    assert_eq!(hours, vec![9, 11, 12]);
    assert_eq!(session.capacity(), Some(100));

    session.on_slot_tapped(&TimeSlot::new(11).unwrap()).unwrap();
    session.on_slot_tapped(&TimeSlot::new(12).unwrap()).unwrap();
    *session.form_mut() = filled_form(150);

    let receipt = session.on_submit().await.unwrap();
    assert!(receipt.capacity_warning.is_some());
    assert!(!session.is_open());
}

#[tokio::test]
async fn test_unauthorized_over_http() {
    let directory_server = MockServer::start().await;
    let booking_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "semanal": { "1": [9] } })))
        .mount(&directory_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/managers/manager-7/blocked-slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&directory_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&booking_server)
        .await;

    let config = Config {
        venue_directory_url: directory_server.uri(),
        booking_service_url: booking_server.uri(),
        ..Config::default()
    };
    let state = Arc::new(bootstrap_state(&config).unwrap());
    let mut session = BookingFormSession::open_booking_form(state, venue(), "artist-1", monday()).await;
    // Capacity endpoint is not mounted: the default applies.
    assert_eq!(session.effective_capacity(), 100);

    session.on_slot_tapped(&TimeSlot::new(9).unwrap()).unwrap();
    *session.form_mut() = filled_form(10);

    let err = session.on_submit().await.unwrap_err();
    assert_eq!(err, BookingError::Submission(SubmissionFailure::Unauthorized { status: 401 }));
    assert!(session.is_open());
}
