use crate::domain::models::{
    availability::RawAvailability,
    blocked_slot::RawBlockedSlot,
    booking::{BookingRequest, SubmissionRejection},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait VenueDirectory: Send + Sync {
    async fn get_availability(&self, manager_id: &str, date: NaiveDate) -> Result<RawAvailability, AppError>;
    async fn get_blocked_slots(&self, manager_id: &str, date: NaiveDate) -> Result<Vec<RawBlockedSlot>, AppError>;
    async fn get_venue_capacity(&self, venue_or_manager_id: &str) -> Result<Option<u32>, AppError>;
}

#[async_trait]
pub trait BookingSubmission: Send + Sync {
    async fn submit_booking_request(&self, request: &BookingRequest) -> Result<(), SubmissionRejection>;
}
