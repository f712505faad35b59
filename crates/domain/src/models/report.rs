//! Report request models.
//!
//! A report request names a [`ReportKind`] and carries a payload whose shape
//! depends on the kind. The raw JSON is resolved once, at the entry point,
//! into the tagged [`ReportPayload`] union; everything downstream matches on
//! the variant instead of probing for optional keys.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use super::device::DeviceRecord;
use super::history::HistoryEntry;
use super::lab::LabSummary;
use super::lenient;
use super::location::LocationSummary;
use super::score::{ScoreFields, Scored};

/// Report granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportKind {
    Global,
    City,
    Lab,
    System,
    Pc,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Global,
        ReportKind::City,
        ReportKind::Lab,
        ReportKind::System,
        ReportKind::Pc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Global => "GLOBAL",
            ReportKind::City => "CITY",
            ReportKind::Lab => "LAB",
            ReportKind::System => "SYSTEM",
            ReportKind::Pc => "PC",
        }
    }

    /// Label used as the leading segment of generated file names.
    pub fn file_label(&self) -> &'static str {
        match self {
            ReportKind::Global => "Global_Level_Report",
            ReportKind::City => "City_Level_Report",
            ReportKind::Lab => "Lab_Level_Report",
            ReportKind::System => "All_Systems_Report",
            ReportKind::Pc => "PC_Report",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PayloadError::UnsupportedKind(s.to_string()))
    }
}

/// Errors raised while resolving a raw report request.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("unsupported report kind: {0}")]
    UnsupportedKind(String),

    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: ReportKind,
        #[source]
        source: serde_json::Error,
    },
}

/// GLOBAL payload: every city aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPayload {
    #[serde(default, deserialize_with = "lenient::list")]
    pub locations: Vec<LocationSummary>,
}

/// CITY payload: every lab of one city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityPayload {
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub labs: Vec<LabSummary>,
}

/// LAB payload: one facility, optionally with its station list.
///
/// Totals are optional because callers may pass either a pre-aggregated lab
/// summary or a bare device listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabPayload {
    #[serde(default, deserialize_with = "lenient::text")]
    pub lab: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lab_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub total_pcs: Option<i64>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub online: Option<i64>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub offline: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub offline_7d: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub offline_30d: i64,
    #[serde(flatten)]
    pub score: ScoreFields,
    #[serde(default, deserialize_with = "lenient::list")]
    pub devices: Vec<DeviceRecord>,
}

impl LabPayload {
    /// Facility name carried by the payload itself (`lab`, then `lab_name`).
    pub fn facility_name(&self) -> Option<&str> {
        self.lab.as_deref().or(self.lab_name.as_deref())
    }

    /// Builds a LAB payload from a lab summary and its stations.
    pub fn from_summary(summary: LabSummary, devices: Vec<DeviceRecord>) -> Self {
        Self {
            lab: None,
            lab_name: summary.lab_name,
            city: summary.city,
            total_pcs: Some(summary.total_pcs),
            online: Some(summary.online),
            offline: Some(summary.offline),
            offline_7d: summary.offline_7d,
            offline_30d: summary.offline_30d,
            score: summary.score,
            devices,
        }
    }

    /// Number of listed stations that are operational.
    pub fn listed_online(&self) -> i64 {
        self.devices.iter().filter(|d| d.is_operational()).count() as i64
    }
}

impl Scored for LabPayload {
    fn score_fields(&self) -> &ScoreFields {
        &self.score
    }
}

/// SYSTEM payload scope, chosen by the presence of a `devices` array.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemScope {
    /// A station listing; rendered like a LAB report.
    Devices(LabPayload),
    /// A lab listing; rendered like a CITY report.
    Labs(CityPayload),
}

/// PC payload: one station with its daily history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcPayload {
    #[serde(flatten)]
    pub device: DeviceRecord,
    #[serde(default, deserialize_with = "lenient::list")]
    pub history: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub session_count: Option<i64>,
}

/// Report payload, one variant per report kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    Global(GlobalPayload),
    City(CityPayload),
    Lab(LabPayload),
    System(SystemScope),
    Pc(PcPayload),
}

impl ReportPayload {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportPayload::Global(_) => ReportKind::Global,
            ReportPayload::City(_) => ReportKind::City,
            ReportPayload::Lab(_) => ReportKind::Lab,
            ReportPayload::System(_) => ReportKind::System,
            ReportPayload::Pc(_) => ReportKind::Pc,
        }
    }

    /// Resolves a raw JSON payload for the given kind.
    ///
    /// `null` is treated as an empty object. A bare array is accepted for
    /// GLOBAL (as `locations`), CITY and SYSTEM (as `labs`). A SYSTEM payload
    /// carrying a `devices` array resolves to [`SystemScope::Devices`],
    /// otherwise to [`SystemScope::Labs`]. Missing fields default to zero;
    /// only structurally undecodable input is an error.
    pub fn resolve(kind: ReportKind, raw: Value) -> Result<Self, PayloadError> {
        let malformed = |source| PayloadError::Malformed { kind, source };

        let raw = match raw {
            Value::Null => Value::Object(Map::new()),
            Value::Array(items) => {
                let key = match kind {
                    ReportKind::Global => "locations",
                    ReportKind::City | ReportKind::System => "labs",
                    ReportKind::Lab => "devices",
                    ReportKind::Pc => "history",
                };
                let mut wrapped = Map::new();
                wrapped.insert(key.to_string(), Value::Array(items));
                Value::Object(wrapped)
            }
            other => other,
        };

        match kind {
            ReportKind::Global => serde_json::from_value(raw)
                .map(ReportPayload::Global)
                .map_err(malformed),
            ReportKind::City => serde_json::from_value(raw)
                .map(ReportPayload::City)
                .map_err(malformed),
            ReportKind::Lab => serde_json::from_value(raw)
                .map(ReportPayload::Lab)
                .map_err(malformed),
            ReportKind::System => {
                let has_devices = raw.get("devices").map(Value::is_array).unwrap_or(false);
                if has_devices {
                    serde_json::from_value(raw)
                        .map(|p| ReportPayload::System(SystemScope::Devices(p)))
                        .map_err(malformed)
                } else {
                    serde_json::from_value(raw)
                        .map(|p| ReportPayload::System(SystemScope::Labs(p)))
                        .map_err(malformed)
                }
            }
            ReportKind::Pc => serde_json::from_value(raw)
                .map(ReportPayload::Pc)
                .map_err(malformed),
        }
    }
}

/// A resolved report request.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ReportRequest {
    pub payload: ReportPayload,

    /// Display label (city, lab or station) also used in the file name.
    #[validate(custom(function = "shared::validation::validate_context_label"))]
    pub context: Option<String>,
}

impl ReportRequest {
    pub fn new(payload: ReportPayload, context: Option<String>) -> Self {
        Self { payload, context }
    }

    pub fn kind(&self) -> ReportKind {
        self.payload.kind()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

/// Wire form of a report request: kind as free text, payload as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReportRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub context: Option<String>,
}

impl TryFrom<RawReportRequest> for ReportRequest {
    type Error = PayloadError;

    fn try_from(raw: RawReportRequest) -> Result<Self, Self::Error> {
        let kind: ReportKind = raw.kind.parse()?;
        let payload = ReportPayload::resolve(kind, raw.payload)?;
        let context = raw.context.filter(|c| !c.trim().is_empty());
        Ok(ReportRequest::new(payload, context))
    }
}
