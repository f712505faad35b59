//! Per-day station rollups.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::score::{ScoreFields, Scored};

/// One day's rollup for a station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "lenient::date")]
    pub history_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub score: ScoreFields,
    #[serde(default, deserialize_with = "lenient::count")]
    pub runtime_minutes: i64,
    #[serde(default, deserialize_with = "lenient::usage_map")]
    pub app_usage: BTreeMap<String, f64>,
}

impl HistoryEntry {
    /// The day this entry covers: the explicit date, else the session start.
    pub fn date(&self) -> Option<NaiveDate> {
        self.history_date
            .or_else(|| self.start_time.map(|ts| ts.date_naive()))
    }
}

impl Scored for HistoryEntry {
    fn score_fields(&self) -> &ScoreFields {
        &self.score
    }
}
