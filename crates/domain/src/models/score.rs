//! Performance score extraction.
//!
//! Backend aggregates expose a performance figure under one of several names
//! depending on the level of the hierarchy: cities and labs carry
//! `avg_performance`, history rows carry `avg_score`, stations carry
//! `cpu_score`. [`resolve_score`] picks one with a fixed priority.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::number_from_value;

/// The raw score candidates carried by any backend record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_performance: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_score: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_score: Option<Value>,
}

impl ScoreFields {
    /// Score fields holding only an average-performance figure.
    pub fn performance(value: f64) -> Self {
        Self {
            avg_performance: Some(Value::from(value)),
            ..Self::default()
        }
    }

    /// Score fields holding only a CPU score.
    pub fn cpu(value: f64) -> Self {
        Self {
            cpu_score: Some(Value::from(value)),
            ..Self::default()
        }
    }

    /// Score fields holding only a daily average score.
    pub fn average(value: f64) -> Self {
        Self {
            avg_score: Some(Value::from(value)),
            ..Self::default()
        }
    }
}

/// Resolves the performance score of a record.
///
/// Priority: `avg_performance`, then `avg_score`, then `cpu_score`. The first
/// field that is present and not `null` is used even if it cannot be parsed;
/// later fields are only consulted when earlier ones are absent. The chosen
/// value is coerced with `parseFloat` semantics (numbers as-is, strings by
/// their leading numeric prefix). Anything unusable or non-finite yields `0.0`.
pub fn resolve_score(fields: &ScoreFields) -> f64 {
    fields
        .avg_performance
        .as_ref()
        .or(fields.avg_score.as_ref())
        .or(fields.cpu_score.as_ref())
        .map(coerce_score)
        .unwrap_or(0.0)
}

/// Coerces a single raw score value, defaulting to `0.0`.
pub fn coerce_score(value: &Value) -> f64 {
    number_from_value(value).unwrap_or(0.0)
}

/// Records that carry a performance score.
pub trait Scored {
    fn score_fields(&self) -> &ScoreFields;

    /// The resolved score; see [`resolve_score`].
    fn score(&self) -> f64 {
        resolve_score(self.score_fields())
    }
}

impl Scored for ScoreFields {
    fn score_fields(&self) -> &ScoreFields {
        self
    }
}
