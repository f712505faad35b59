//! Per-kind report aggregation.
//!
//! Pure functions from resolved payloads to the figures printed in summary
//! boxes and tables. Missing inputs have already been zero-filled by the
//! lenient decoders, so nothing here can fail.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{HistoryEntry, LabPayload, LabSummary, LocationSummary, Scored};

/// Maximum number of applications listed in a station report.
pub const TOP_APPS_LIMIT: usize = 10;

/// Maximum number of history rows listed in a station report.
pub const HISTORY_LIMIT: usize = 7;

/// Network-wide totals for a GLOBAL report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalOverview {
    pub city_count: usize,
    pub total_labs: i64,
    pub total_pcs: i64,
    pub total_online: i64,
}

impl GlobalOverview {
    pub fn from_locations(locations: &[LocationSummary]) -> Self {
        locations.iter().fold(
            Self {
                city_count: locations.len(),
                ..Self::default()
            },
            |acc, loc| Self {
                total_labs: acc.total_labs.saturating_add(loc.total_labs),
                total_pcs: acc.total_pcs.saturating_add(loc.total_pcs),
                total_online: acc.total_online.saturating_add(loc.online),
                ..acc
            },
        )
    }
}

/// City-wide figures for a CITY report (and SYSTEM over labs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CityOverview {
    pub lab_count: usize,
    pub active_labs: usize,
    pub total_pcs: i64,
    pub total_online: i64,
    pub total_offline: i64,
    /// PC-weighted average performance, in percent.
    pub average_performance: f64,
}

impl CityOverview {
    pub fn from_labs(labs: &[LabSummary]) -> Self {
        Self {
            lab_count: labs.len(),
            active_labs: labs.iter().filter(|l| l.is_active()).count(),
            total_pcs: saturating_sum(labs.iter().map(|l| l.total_pcs)),
            total_online: saturating_sum(labs.iter().map(|l| l.online)),
            total_offline: saturating_sum(labs.iter().map(|l| l.offline)),
            average_performance: weighted_performance(labs),
        }
    }
}

/// `Σ(score × total_pcs) / Σ total_pcs`, or 0 when no PCs are counted.
///
/// A lab with more stations pulls the average proportionally harder; an empty
/// lab contributes nothing.
pub fn weighted_performance(labs: &[LabSummary]) -> f64 {
    let total_pcs = saturating_sum(labs.iter().map(|l| l.total_pcs));
    if total_pcs <= 0 {
        return 0.0;
    }

    let weighted: f64 = labs.iter().map(|l| l.score() * l.total_pcs as f64).sum();
    let avg = weighted / total_pcs as f64;
    if avg.is_finite() {
        avg
    } else {
        0.0
    }
}

/// The per-lab "PERF SCORE" column: the lab's score scaled by its PC count.
///
/// A lab with no PCs counted shows its bare score.
pub fn lab_perf_score(lab: &LabSummary) -> f64 {
    let weight = if lab.total_pcs == 0 { 1 } else { lab.total_pcs };
    (lab.score() * weight as f64).round()
}

/// Sums counts, clamping at the `i64` bounds instead of overflowing.
fn saturating_sum(counts: impl Iterator<Item = i64>) -> i64 {
    counts.fold(0, i64::saturating_add)
}

/// Facility figures for a LAB report (and SYSTEM over devices).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FleetOverview {
    pub total_pcs: i64,
    pub online: i64,
    pub offline: i64,
    pub offline_7d: i64,
    pub offline_30d: i64,
    /// Unweighted mean of station scores, in percent.
    pub average_performance: f64,
}

impl FleetOverview {
    /// Pre-aggregated totals win over counts derived from the device list.
    pub fn from_payload(payload: &LabPayload) -> Self {
        let total_pcs = payload
            .total_pcs
            .unwrap_or(payload.devices.len() as i64);
        let online = payload.online.unwrap_or_else(|| payload.listed_online());
        let offline = payload
            .offline
            .unwrap_or_else(|| total_pcs.saturating_sub(online).max(0));

        let average_performance = if payload.devices.is_empty() {
            payload.score()
        } else {
            let sum: f64 = payload.devices.iter().map(|d| d.score()).sum();
            sum / payload.devices.len() as f64
        };

        Self {
            total_pcs,
            online,
            offline,
            offline_7d: payload.offline_7d,
            offline_30d: payload.offline_30d,
            average_performance: if average_performance.is_finite() {
                average_performance
            } else {
                0.0
            },
        }
    }
}

/// One row of the application usage table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppShare {
    pub name: String,
    pub seconds: f64,
    /// Share of all recorded usage, in percent.
    pub share: f64,
}

/// Top `limit` applications by foreground seconds, largest first.
///
/// Ties are broken by name. Shares are computed against the sum over every
/// application, not just the ones returned.
pub fn top_apps(usage: &BTreeMap<String, f64>, limit: usize) -> Vec<AppShare> {
    let total: f64 = usage.values().sum();

    let mut apps: Vec<(&String, f64)> = usage.iter().map(|(name, secs)| (name, *secs)).collect();
    apps.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    apps.into_iter()
        .take(limit)
        .map(|(name, seconds)| AppShare {
            name: name.clone(),
            seconds,
            share: if total > 0.0 {
                seconds / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// The first `limit` history entries, in the order supplied.
pub fn recent_history(history: &[HistoryEntry], limit: usize) -> &[HistoryEntry] {
    &history[..history.len().min(limit)]
}
