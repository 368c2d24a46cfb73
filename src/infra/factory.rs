use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::infra::booking::http_booking_service::HttpBookingService;
use crate::infra::venue_directory::http_venue_directory::HttpVenueDirectory;
use crate::state::AppState;

pub fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    for (name, url) in [
        ("VENUE_DIRECTORY_URL", &config.venue_directory_url),
        ("BOOKING_SERVICE_URL", &config.booking_service_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!("{} must be an http(s) URL, got '{}'", name, url)));
        }
    }

    info!(
        "Using venue directory at {} and booking service at {} (timeout {}s)",
        config.venue_directory_url, config.booking_service_url, config.request_timeout_secs
    );

    let venue_directory = Arc::new(HttpVenueDirectory::new(
        config.venue_directory_url.clone(),
        config.api_token.clone(),
        config.request_timeout(),
    ));
    let booking_service = Arc::new(HttpBookingService::new(
        config.booking_service_url.clone(),
        config.api_token.clone(),
        config.request_timeout(),
    ));

    Ok(AppState {
        config: config.clone(),
        venue_directory,
        booking_service,
    })
}
