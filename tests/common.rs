use venue_booking::{
    config::Config,
    domain::models::{
        availability::RawAvailability,
        blocked_slot::RawBlockedSlot,
        booking::{BookingForm, BookingRequest, SubmissionRejection, VenueRef},
    },
    domain::ports::{BookingSubmission, VenueDirectory},
    error::AppError,
    state::AppState,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory Venue Directory with per-date overrides, delays and failure switches.
#[derive(Default)]
pub struct MockVenueDirectory {
    pub weekly: Mutex<Value>,
    pub date_specific: Mutex<HashMap<NaiveDate, Value>>,
    pub blocked: Mutex<Vec<Value>>,
    pub capacity: Mutex<Option<u32>>,
    pub delays: Mutex<HashMap<NaiveDate, Duration>>,
    pub fail_availability: AtomicBool,
    pub fail_blocked: AtomicBool,
    pub fail_capacity: AtomicBool,
    pub availability_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockVenueDirectory {
    pub fn with_weekly(weekly: Value) -> Self {
        let dir = Self::default();
        *dir.weekly.lock().unwrap() = weekly;
        dir
    }

    pub fn set_weekly(&self, weekly: Value) {
        *self.weekly.lock().unwrap() = weekly;
    }

    pub fn set_date_specific(&self, date: NaiveDate, hours: Value) {
        self.date_specific.lock().unwrap().insert(date, hours);
    }

    pub fn set_blocked(&self, blocked: Value) {
        *self.blocked.lock().unwrap() = blocked.as_array().cloned().unwrap_or_default();
    }

    pub fn set_capacity(&self, capacity: Option<u32>) {
        *self.capacity.lock().unwrap() = capacity;
    }

    pub fn set_delay(&self, date: NaiveDate, delay: Duration) {
        self.delays.lock().unwrap().insert(date, delay);
    }

    pub fn fail_availability(&self, fail: bool) {
        self.fail_availability.store(fail, Ordering::SeqCst);
    }

    pub fn fail_blocked(&self, fail: bool) {
        self.fail_blocked.store(fail, Ordering::SeqCst);
    }

    pub fn fail_capacity(&self, fail: bool) {
        self.fail_capacity.store(fail, Ordering::SeqCst);
    }

    fn delay_for(&self, date: NaiveDate) -> Option<Duration> {
        self.delays.lock().unwrap().get(&date).copied()
    }
}

#[async_trait]
impl VenueDirectory for MockVenueDirectory {
    async fn get_availability(&self, _manager_id: &str, date: NaiveDate) -> Result<RawAvailability, AppError> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay_for(date) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_availability.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection refused".to_string()));
        }
        let weekly = Some(self.weekly.lock().unwrap().clone()).filter(|w| !w.is_null());
        let date_specific = self.date_specific.lock().unwrap().get(&date).cloned();
        Ok(RawAvailability { weekly, date_specific })
    }

    async fn get_blocked_slots(&self, _manager_id: &str, _date: NaiveDate) -> Result<Vec<RawBlockedSlot>, AppError> {
        if self.fail_blocked.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamStatus { status: 502, body: "bad gateway".to_string() });
        }
        let blocked = self.blocked.lock().unwrap().clone();
        serde_json::from_value(Value::Array(blocked)).map_err(|e| AppError::Parse(e.to_string()))
    }

    async fn get_venue_capacity(&self, _venue_or_manager_id: &str) -> Result<Option<u32>, AppError> {
        if self.fail_capacity.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection reset".to_string()));
        }
        Ok(*self.capacity.lock().unwrap())
    }
}

/// Booking Submission mock that records every request and replays queued responses.
#[derive(Default)]
pub struct MockBookingService {
    pub responses: Mutex<VecDeque<Result<(), SubmissionRejection>>>,
    pub received: Mutex<Vec<BookingRequest>>,
    pub delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl MockBookingService {
    pub fn respond_with(&self, response: Result<(), SubmissionRejection>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn received(&self) -> Vec<BookingRequest> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingSubmission for MockBookingService {
    async fn submit_booking_request(&self, request: &BookingRequest) -> Result<(), SubmissionRejection> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.received.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub directory: Arc<MockVenueDirectory>,
    pub booking: Arc<MockBookingService>,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new(weekly: Value) -> Self {
        Self::with_config(weekly, Config { request_timeout_secs: 5, ..Config::default() })
    }

    pub fn with_config(weekly: Value, config: Config) -> Self {
        let directory = Arc::new(MockVenueDirectory::with_weekly(weekly));
        let booking = Arc::new(MockBookingService::default());
        let state = Arc::new(AppState {
            config,
            venue_directory: directory.clone(),
            booking_service: booking.clone(),
        });
        Self { directory, booking, state }
    }
}

#[allow(dead_code)]
pub fn venue() -> VenueRef {
    VenueRef {
        venue_id: "venue-42".to_string(),
        venue_name: "Teatro Municipal".to_string(),
        manager_id: "manager-7".to_string(),
    }
}

#[allow(dead_code)]
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[allow(dead_code)]
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

#[allow(dead_code)]
pub fn filled_form(attendees: u32) -> BookingForm {
    BookingForm {
        title: "Noche de jazz".to_string(),
        description: "Quartet with guest vocalist".to_string(),
        event_type: "concierto".to_string(),
        category: Some("musica".to_string()),
        expected_attendees: Some(attendees),
        requirements: Some("Grand piano".to_string()),
    }
}
