use crate::domain::models::booking::{BookingRequest, SubmissionRejection};
use crate::domain::ports::BookingSubmission;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, instrument};

pub struct HttpBookingService {
    client: Client,
    api_url: String,
    api_token: Option<String>,
}

impl HttpBookingService {
    pub fn new(base_url: String, api_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: format!("{}/solicitudes", base_url.trim_end_matches('/')),
            api_token,
        }
    }
}

/// Pulls `message`/`error`/`detail` out of a JSON error body, or returns the raw text.
fn server_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let extracted = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "mensaje", "error", "detail"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });
    Some(extracted.unwrap_or_else(|| body.to_string()))
}

#[async_trait]
impl BookingSubmission for HttpBookingService {
    #[instrument(skip(self, request), fields(request_id = %request.request_id()))]
    async fn submit_booking_request(&self, request: &BookingRequest) -> Result<(), SubmissionRejection> {
        let mut req = self.client.post(&self.api_url)
            .header("X-Request-Id", request.request_id().to_string())
            .json(request);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await.map_err(|e| {
            error!("Booking service connection error: {}", e);
            SubmissionRejection::unreachable(e.to_string())
        })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!("Booking service rejected request. Status: {}, Body: {}", status, text);
            return Err(SubmissionRejection::status(status.as_u16(), server_message(&text)));
        }

        Ok(())
    }
}
