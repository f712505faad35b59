//! Fleet monitoring backend client.
//!
//! The backend owns station telemetry; this service only reads the same
//! aggregate endpoints the dashboard uses and turns them into report payloads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use domain::models::{CityPayload, DeviceDetail, DeviceFilter, DeviceList, GlobalPayload};

use crate::config::BackendConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend request timeout after {0}ms")]
    Timeout(u64),

    #[error("Backend returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// Source Trait
// ============================================================================

/// Read access to fleet aggregates.
#[async_trait]
pub trait FleetSource: Send + Sync {
    /// Per-city rollups, `/stats/locations`.
    async fn locations(&self) -> Result<GlobalPayload, BackendError>;

    /// Labs of one city, `/stats/city/{city}/labs`.
    async fn city_labs(&self, city: &str) -> Result<CityPayload, BackendError>;

    /// Station listing, `/devices?city&lab&status&search`.
    async fn devices(&self, filter: &DeviceFilter) -> Result<DeviceList, BackendError>;

    /// One station with its history, `/devices/{id}`.
    async fn device(&self, system_id: &str) -> Result<DeviceDetail, BackendError>;

    /// Cheap reachability check used by readiness.
    async fn ping(&self) -> Result<(), BackendError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

pub struct HttpFleetClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
    timeout_ms: u64,
}

impl HttpFleetClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        // A trailing slash keeps the API prefix when segments are appended.
        let base = format!("{}/", config.base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| BackendError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base));
        }

        Ok(Self {
            client,
            base_url,
            api_token: config
                .api_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        resource: &str,
        query: Option<&DeviceFilter>,
    ) -> Result<T, BackendError> {
        debug!(url = %url, "Calling fleet backend");

        let mut request = self.client.get(url);
        if let Some(filter) = query {
            request = request.query(filter);
        }
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status(status.as_u16(), truncate(&body, 200)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout_ms)
        } else {
            BackendError::Unreachable(e.to_string())
        }
    }
}

#[async_trait]
impl FleetSource for HttpFleetClient {
    async fn locations(&self) -> Result<GlobalPayload, BackendError> {
        let url = self.endpoint(&["stats", "locations"])?;
        self.get_json(url, "location stats", None).await
    }

    async fn city_labs(&self, city: &str) -> Result<CityPayload, BackendError> {
        let url = self.endpoint(&["stats", "city", city, "labs"])?;
        let mut payload: CityPayload = self
            .get_json(url, &format!("city {}", city), None)
            .await?;
        if payload.city.is_none() {
            payload.city = Some(city.to_string());
        }
        Ok(payload)
    }

    async fn devices(&self, filter: &DeviceFilter) -> Result<DeviceList, BackendError> {
        let url = self.endpoint(&["devices"])?;
        self.get_json(url, "device listing", Some(filter)).await
    }

    async fn device(&self, system_id: &str) -> Result<DeviceDetail, BackendError> {
        let url = self.endpoint(&["devices", system_id])?;
        self.get_json(url, &format!("device {}", system_id), None)
            .await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let url = self.endpoint(&["stats", "locations"])?;
        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(status.as_u16(), String::new()))
        }
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
