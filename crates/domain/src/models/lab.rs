//! Lab (facility) aggregate model.

use serde::{Deserialize, Serialize};

use super::lenient;
use super::score::{ScoreFields, Scored};

/// Aggregate figures for one lab, as returned by `/stats/city/{city}/labs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub lab_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_pcs: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub online: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub offline: i64,
    /// Stations unseen for 7+ days.
    #[serde(default, deserialize_with = "lenient::count")]
    pub offline_7d: i64,
    /// Stations unseen for 30+ days.
    #[serde(default, deserialize_with = "lenient::count")]
    pub offline_30d: i64,
    #[serde(flatten)]
    pub score: ScoreFields,
}

impl LabSummary {
    pub fn name(&self) -> &str {
        self.lab_name.as_deref().unwrap_or_default()
    }

    /// A lab is active while at least one station reports online.
    pub fn is_active(&self) -> bool {
        self.online > 0
    }

    /// Case-insensitive match on the lab name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name().trim().eq_ignore_ascii_case(name.trim())
    }
}

impl Scored for LabSummary {
    fn score_fields(&self) -> &ScoreFields {
        &self.score
    }
}
