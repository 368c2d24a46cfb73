use crate::domain::models::availability::RawAvailability;
use crate::domain::models::blocked_slot::RawBlockedSlot;
use crate::domain::ports::VenueDirectory;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, instrument};

pub struct HttpVenueDirectory {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpVenueDirectory {
    pub fn new(base_url: String, api_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout,
        }
    }

    /// Transport failures. A client timeout is reported like the session's own
    /// timeout, so callers see one variant however the deadline was hit.
    fn transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            error!("Venue directory timed out after {:?}: {}", self.timeout, e);
            AppError::Timeout(self.timeout.as_secs())
        } else {
            let msg = format!("Venue directory connection error: {}", e);
            error!("{}", msg);
            AppError::Network(msg)
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self.client.get(format!("{}{}", self.base_url, path));
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, AppError> {
        let res = req.send().await.map_err(|e| self.transport_error(e))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!("Venue directory failed. Status: {}, Body: {}", status, body);
            return Err(AppError::UpstreamStatus { status: status.as_u16(), body });
        }

        let body = res.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            error!("Failed to parse venue directory response: {:?}", e);
            AppError::Parse(e.to_string())
        })
    }
}

#[derive(Deserialize)]
struct CapacityPayload {
    #[serde(default, alias = "capacity")]
    capacidad: Value,
}

fn coerce_capacity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|c| u32::try_from(c).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl VenueDirectory for HttpVenueDirectory {
    #[instrument(skip(self))]
    async fn get_availability(&self, manager_id: &str, date: NaiveDate) -> Result<RawAvailability, AppError> {
        let req = self
            .get(&format!("/managers/{}/availability", manager_id))
            .query(&[("fecha", date.format("%Y-%m-%d").to_string())]);
        self.fetch_json(req).await
    }

    #[instrument(skip(self))]
    async fn get_blocked_slots(&self, manager_id: &str, date: NaiveDate) -> Result<Vec<RawBlockedSlot>, AppError> {
        let req = self
            .get(&format!("/managers/{}/blocked-slots", manager_id))
            .query(&[("fecha", date.format("%Y-%m-%d").to_string())]);
        let body: Option<Vec<RawBlockedSlot>> = self.fetch_json(req).await?;
        Ok(body.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn get_venue_capacity(&self, venue_or_manager_id: &str) -> Result<Option<u32>, AppError> {
        let req = self.get(&format!("/venues/{}/capacity", venue_or_manager_id));
        let body: CapacityPayload = self.fetch_json(req).await?;
        Ok(coerce_capacity(&body.capacidad))
    }
}
