//! Station (lab computer) model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::history::HistoryEntry;
use super::lenient;
use super::score::{ScoreFields, Scored};

/// Status label reported by the backend.
///
/// This is a label only; liveness is derived from `last_seen`, see
/// [`crate::services::liveness`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    #[default]
    Offline,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        }
    }

    /// Parses a status label; anything other than `online` is offline.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("online") {
            DeviceStatus::Online
        } else {
            DeviceStatus::Offline
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, DeviceStatus::Online)
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(label
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(DeviceStatus::from_label)
            .unwrap_or_default())
    }
}

/// Snapshot of one monitored station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub system_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub pc_name: Option<String>,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(flatten)]
    pub score: ScoreFields,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lab_name: Option<String>,
    /// Application name to foreground seconds.
    #[serde(default, deserialize_with = "lenient::usage_map")]
    pub app_usage: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub runtime_minutes: i64,
    /// First heartbeat of the current day.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub today_start_time: Option<DateTime<Utc>>,
    /// Liveness flag computed by the caller against server time.
    #[serde(
        default,
        rename = "isOnline",
        alias = "is_online",
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_online: Option<bool>,
}

impl DeviceRecord {
    pub fn system_id(&self) -> &str {
        self.system_id.as_deref().unwrap_or_default()
    }

    /// Effective liveness: the caller's flag when supplied, else the status label.
    pub fn is_operational(&self) -> bool {
        self.is_online.unwrap_or_else(|| self.status.is_online())
    }
}

impl Scored for DeviceRecord {
    fn score_fields(&self) -> &ScoreFields {
        &self.score
    }
}

/// Station detail as returned by `/devices/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDetail {
    #[serde(default)]
    pub device: Option<DeviceRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub history: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub server_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub session_count: Option<i64>,
}

/// Station listing as returned by `/devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceList {
    #[serde(default, deserialize_with = "lenient::list")]
    pub devices: Vec<DeviceRecord>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub server_time: Option<DateTime<Utc>>,
}

/// Query filter for `/devices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab: Option<String>,
    /// `online` or `offline`; omitted for all stations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl DeviceFilter {
    /// Human-readable scope, e.g. `PUNE / MAIN HALL A`.
    pub fn scope_label(&self) -> Option<String> {
        match (&self.city, &self.lab) {
            (Some(city), Some(lab)) => Some(format!("{} / {}", city, lab)),
            (Some(city), None) => Some(city.clone()),
            (None, Some(lab)) => Some(lab.clone()),
            (None, None) => None,
        }
    }
}
