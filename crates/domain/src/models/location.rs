//! City-level aggregate model.

use serde::{Deserialize, Serialize};

use super::lenient;
use super::score::{ScoreFields, Scored};

/// Aggregate figures for one city, as returned by `/stats/locations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_labs: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_pcs: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub online: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub offline: i64,
    #[serde(flatten)]
    pub score: ScoreFields,
}

impl LocationSummary {
    /// City name, or an empty string when the backend omitted it.
    pub fn city_name(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }
}

impl Scored for LocationSummary {
    fn score_fields(&self) -> &ScoreFields {
        &self.score
    }
}
