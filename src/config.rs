use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_VENUE_CAPACITY: u32 = 100;
pub const DEFAULT_LOG_FILTER: &str = "info,venue_booking=debug";

#[derive(Clone, Debug)]
pub struct Config {
    pub venue_directory_url: String,
    pub booking_service_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub default_venue_capacity: u32,
    /// Directory for the daily-rolled JSON log file.
    pub log_dir: String,
    /// `EnvFilter` directives for the JSON log file.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            venue_directory_url: "http://localhost:8000/api/v1".to_string(),
            booking_service_url: "http://localhost:8000/api/v1".to_string(),
            api_token: None,
            request_timeout_secs: 15,
            default_venue_capacity: DEFAULT_VENUE_CAPACITY,
            log_dir: "./logs".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            venue_directory_url: env::var("VENUE_DIRECTORY_URL").unwrap_or(defaults.venue_directory_url),
            booking_service_url: env::var("BOOKING_SERVICE_URL").unwrap_or(defaults.booking_service_url),
            api_token: env::var("BOOKING_API_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.request_timeout_secs),
            default_venue_capacity: env::var("DEFAULT_VENUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_venue_capacity),
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            log_filter: env::var("LOG_FILTER").unwrap_or(defaults.log_filter),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Filter for the JSON log file. Unparseable directives fall back to the default.
    pub fn file_log_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}
