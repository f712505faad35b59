//! Common test utilities for integration tests.
//!
//! The router runs against an in-memory fleet source so no backend is needed.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use domain::models::{
    CityPayload, DeviceDetail, DeviceFilter, DeviceList, GlobalPayload, LabSummary,
};
use lab_guardian_api::{
    app::create_app,
    config::{BackendConfig, Config, LoggingConfig, ReportsConfig, SecurityConfig, ServerConfig},
    services::{BackendError, FleetSource},
};

/// Reference clock reported by the stub backend.
pub fn server_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

/// In-memory fleet source with canned responses.
#[derive(Default)]
pub struct StubFleet {
    pub locations: GlobalPayload,
    pub cities: HashMap<String, CityPayload>,
    pub devices: DeviceList,
    pub details: HashMap<String, DeviceDetail>,
    pub reachable: bool,
    /// Every device filter the stub was asked for.
    pub device_queries: Mutex<Vec<DeviceFilter>>,
}

impl StubFleet {
    /// A small fleet: one city with two labs, three stations.
    pub fn sample() -> Self {
        let locations: GlobalPayload = serde_json::from_value(json!({
            "locations": [
                {"city": "Pune", "total_labs": 2, "total_pcs": 30, "online": 21, "offline": 9, "avg_performance": 64.2},
                {"city": "Nagpur", "total_labs": 1, "total_pcs": 12, "online": 12, "offline": 0, "avg_performance": 71.0}
            ]
        }))
        .unwrap();

        let pune: CityPayload = serde_json::from_value(json!({
            "labs": [
                {"lab_name": "Main Hall A", "total_pcs": 20, "online": 14, "offline": 6, "offline_7d": 2, "offline_30d": 1, "avg_performance": 60},
                {"lab_name": "Annex", "total_pcs": 10, "online": 7, "offline": 3, "avg_performance": 72}
            ]
        }))
        .unwrap();

        let devices: DeviceList = serde_json::from_value(json!({
            "devices": [
                {"system_id": "HW-1", "pc_name": "Station 1", "status": "online", "cpu_score": 40, "last_seen": "2024-05-01T09:59:40Z", "city": "Pune", "lab_name": "Main Hall A"},
                {"system_id": "HW-2", "pc_name": "Station 2", "status": "online", "cpu_score": 55, "last_seen": "2024-05-01T09:40:00Z", "city": "Pune", "lab_name": "Main Hall A"},
                {"system_id": "HW-3", "pc_name": "Station 3", "status": "offline", "cpu_score": 0, "city": "Pune", "lab_name": "Main Hall A"}
            ],
            "server_time": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        let detail: DeviceDetail = serde_json::from_value(json!({
            "device": {
                "system_id": "HW-1",
                "pc_name": "Station 1",
                "status": "online",
                "cpu_score": 40,
                "last_seen": "2024-05-01T09:59:40Z",
                "city": "Pune",
                "lab_name": "Main Hall A",
                "app_usage": {"Chrome": 3600, "Word": 1800},
                "runtime_minutes": 95
            },
            "history": [{"history_date": "2024-04-30", "avg_score": 61, "runtime_minutes": 300}],
            "server_time": "2024-05-01T10:00:00Z",
            "session_count": 4
        }))
        .unwrap();

        let mut cities = HashMap::new();
        cities.insert("Pune".to_string(), pune);
        let mut details = HashMap::new();
        details.insert("HW-1".to_string(), detail);

        Self {
            locations,
            cities,
            devices,
            details,
            reachable: true,
            device_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.reachable {
            Ok(())
        } else {
            Err(BackendError::Unreachable("connection refused".to_string()))
        }
    }
}

#[async_trait]
impl FleetSource for StubFleet {
    async fn locations(&self) -> Result<GlobalPayload, BackendError> {
        self.check()?;
        Ok(self.locations.clone())
    }

    async fn city_labs(&self, city: &str) -> Result<CityPayload, BackendError> {
        self.check()?;
        let mut payload = self
            .cities
            .get(city)
            .cloned()
            .unwrap_or_else(|| CityPayload {
                city: None,
                labs: Vec::<LabSummary>::new(),
            });
        payload.city.get_or_insert_with(|| city.to_string());
        Ok(payload)
    }

    async fn devices(&self, filter: &DeviceFilter) -> Result<DeviceList, BackendError> {
        self.check()?;
        self.device_queries.lock().unwrap().push(filter.clone());
        Ok(self.devices.clone())
    }

    async fn device(&self, system_id: &str) -> Result<DeviceDetail, BackendError> {
        self.check()?;
        self.details
            .get(system_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("device {}", system_id)))
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.check()
    }
}

/// Test configuration; nothing here touches the network or disk.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        backend: BackendConfig {
            base_url: "http://fleet.test/api".to_string(),
            api_token: None,
            timeout_ms: 1000,
        },
        reports: ReportsConfig {
            output_dir: PathBuf::from("reports"),
            utc_offset_minutes: 330,
            daily_enabled: false,
            retention_days: 30,
            max_payload_bytes: 64 * 1024,
        },
    }
}

/// Create a test application router backed by `fleet`.
pub fn create_test_app(fleet: Arc<StubFleet>) -> Router {
    create_app(test_config(), fleet)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// The `filename` parameter of a `Content-Disposition` header.
pub fn attachment_name(response: &axum::response::Response) -> String {
    let value = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    value
        .split("filename=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap_or_default()
        .to_string()
}
