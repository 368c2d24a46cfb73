use std::sync::Arc;
use crate::domain::ports::{BookingSubmission, VenueDirectory};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub venue_directory: Arc<dyn VenueDirectory>,
    pub booking_service: Arc<dyn BookingSubmission>,
}
