//! Per-kind section building.
//!
//! Turns a resolved [`ReportRequest`] into layout blocks. The arithmetic lives
//! in `domain::services::aggregation`; this module decides labels, ordering
//! and styling.

use chrono::{DateTime, FixedOffset, Utc};

use domain::models::{
    CityPayload, DeviceRecord, GlobalPayload, LabPayload, PcPayload, ReportPayload,
    ReportRequest, Scored, SystemScope,
};
use domain::services::{
    lab_perf_score, recent_history, top_apps, CityOverview, FleetOverview, GlobalOverview,
    HISTORY_LIMIT, TOP_APPS_LIMIT,
};
use shared::format::{format_clock, format_minutes, format_percent, format_seconds, format_whole};

use crate::layout::{Block, Cell, ColumnStyle, SummaryItem, Table, TableStyle};
use crate::theme::Swatch;

const NOT_AVAILABLE: &str = "N/A";

/// Builds the body blocks of a report.
#[derive(Debug, Clone, Copy)]
pub struct SectionBuilder {
    offset: FixedOffset,
}

impl SectionBuilder {
    /// `offset` is the zone wall-clock times are printed in.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn build(&self, request: &ReportRequest) -> Vec<Block> {
        let context = request.context();
        match &request.payload {
            ReportPayload::Global(payload) => self.global(payload),
            ReportPayload::City(payload) => self.city(payload, context),
            ReportPayload::Lab(payload) => self.lab(payload, context),
            ReportPayload::System(SystemScope::Devices(payload)) => self.lab(payload, context),
            ReportPayload::System(SystemScope::Labs(payload)) => self.city(payload, context),
            ReportPayload::Pc(payload) => self.station(payload),
        }
    }

    fn global(&self, payload: &GlobalPayload) -> Vec<Block> {
        let overview = GlobalOverview::from_locations(&payload.locations);

        let rows = payload
            .locations
            .iter()
            .map(|loc| {
                vec![
                    Cell::text(loc.city_name().to_uppercase()),
                    Cell::text(loc.total_labs),
                    Cell::text(loc.total_pcs),
                    Cell::text(loc.online).colored(Swatch::Success),
                    Cell::text(loc.offline).colored(Swatch::Danger),
                    Cell::text(format_percent(loc.score())),
                ]
            })
            .collect();

        vec![
            Block::Summary(vec![
                SummaryItem::new("TOTAL CITIES", overview.city_count),
                SummaryItem::new("TOTAL LABS", overview.total_labs),
                SummaryItem::new("TOTAL SYSTEMS", overview.total_pcs),
                SummaryItem::new("LIVE NODES", overview.total_online),
            ]),
            Block::heading("REGIONAL INFRASTRUCTURE DISTRIBUTION"),
            Block::Table(
                Table::new(TableStyle::Striped)
                    .head(
                        ["CITY / REGION", "LABS", "TOTAL PCS", "ONLINE", "OFFLINE", "PERFORMANCE"],
                        Swatch::Navy,
                    )
                    .rows(rows)
                    .centered()
                    .column(0, ColumnStyle::label()),
            ),
        ]
    }

    fn city(&self, payload: &CityPayload, context: Option<&str>) -> Vec<Block> {
        let overview = CityOverview::from_labs(&payload.labs);
        let city_name = context
            .or(payload.city.as_deref())
            .unwrap_or("TOTAL SYSTEM")
            .to_uppercase();

        let rows = payload
            .labs
            .iter()
            .map(|lab| {
                vec![
                    Cell::text(lab.name().to_uppercase()),
                    Cell::text(lab.total_pcs),
                    Cell::text(lab.online).colored(Swatch::Success),
                    Cell::text(lab.offline).colored(Swatch::Danger),
                    Cell::text(format_whole(lab_perf_score(lab))),
                    Cell::text(format_percent(lab.score())),
                ]
            })
            .collect();

        vec![
            Block::Summary(vec![
                SummaryItem::new("CITY NAME", &city_name),
                SummaryItem::new(
                    "LABS ACTIVE",
                    format!("{} / {}", overview.active_labs, overview.lab_count),
                ),
                SummaryItem::new("TOTAL NODES", overview.total_pcs),
                SummaryItem::new("CITY HEALTH", format_percent(overview.average_performance)),
            ]),
            Block::heading(format!("LAB CLUSTER DETAILS: {}", city_name)),
            Block::Table(
                Table::new(TableStyle::Striped)
                    .head(
                        ["LAB FACILITY NAME", "PCS", "ONLINE", "OFFLINE", "PERF SCORE", "HEALTH"],
                        Swatch::Primary,
                    )
                    .rows(rows)
                    .centered()
                    .column(0, ColumnStyle::label()),
            ),
        ]
    }

    fn lab(&self, payload: &LabPayload, context: Option<&str>) -> Vec<Block> {
        let overview = FleetOverview::from_payload(payload);
        let lab_name = context
            .or(payload.facility_name())
            .unwrap_or("GLOBAL FLEET");
        let city_name = payload.city.as_deref().unwrap_or("NETWORK HUB");

        let mut blocks = vec![
            Block::Summary(vec![
                SummaryItem::new(
                    "LOCATION",
                    format!("{} / {}", city_name, lab_name).to_uppercase(),
                ),
                SummaryItem::new("TOTAL PC", overview.total_pcs),
                SummaryItem::new("ONLINE", overview.online),
                SummaryItem::new("OFFLINE", overview.offline),
            ]),
            Block::Summary(vec![
                SummaryItem::new("7+ DAYS OFFLINE", overview.offline_7d),
                SummaryItem::new("30+ DAYS OFFLINE", overview.offline_30d),
                SummaryItem::new("SECURITY STATUS", "ENCRYPTED"),
                SummaryItem::new("LAB HEALTH", format_percent(overview.average_performance)),
            ]),
            Block::heading(format!(
                "DETAILED NODE INVENTORY: {}",
                lab_name.to_uppercase()
            )),
        ];

        if payload.devices.is_empty() {
            blocks.push(Block::Notice(
                "No detailed node inventory available for this cluster.".to_string(),
            ));
            return blocks;
        }

        let rows = payload.devices.iter().map(|d| self.device_row(d)).collect();
        blocks.push(Block::Table(
            Table::new(TableStyle::Grid)
                .head(
                    ["STATION NAME", "SYSTEM ID", "STATUS", "CPU LOAD", "TOTAL SCORE", "TIMESTAMP"],
                    Swatch::Navy,
                )
                .rows(rows)
                .fonts(7.0, 8.0)
                .padding(3.0)
                .centered()
                .column(0, ColumnStyle::label()),
        ));
        blocks
    }

    fn device_row(&self, device: &DeviceRecord) -> Vec<Cell> {
        let (status, swatch) = if device.is_operational() {
            ("ONLINE", Swatch::Success)
        } else {
            ("OFFLINE", Swatch::Danger)
        };
        let name = device
            .pc_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "STATION".to_string());

        vec![
            Cell::text(name),
            Cell::text(device.system_id()),
            Cell::text(status).colored(swatch).bold(),
            Cell::text(format_percent(device.score())),
            Cell::text(format_whole(device.score())),
            Cell::text(self.clock(device.last_seen)),
        ]
    }

    fn station(&self, payload: &PcPayload) -> Vec<Block> {
        let device = &payload.device;
        let name = device
            .pc_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("STATION")
            .to_uppercase();
        let upper_or_na = |value: Option<&str>| {
            value
                .filter(|v| !v.is_empty())
                .map(str::to_uppercase)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        let info = [
            ("System ID", device.system_id.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())),
            ("Region", upper_or_na(device.city.as_deref())),
            ("Facility", upper_or_na(device.lab_name.as_deref())),
            ("Architecture", "x86_64 / Pro Agent".to_string()),
            (
                "Current Status",
                if device.is_operational() {
                    "OPERATIONAL (ONLINE)".to_string()
                } else {
                    "IDLE (OFFLINE)".to_string()
                },
            ),
            ("Boot Time Today", self.clock(device.today_start_time)),
            ("Total Runtime", format_minutes(device.runtime_minutes)),
            ("Health Score", format!("{} Units", format_percent(device.score()))),
        ];

        let mut blocks = vec![
            Block::Heading {
                text: format!("STATION PROFILE: {}", name),
                size: 18.0,
            },
            Block::Table(
                Table::new(TableStyle::Plain)
                    .rows(
                        info.into_iter()
                            .map(|(label, value)| vec![Cell::text(label), Cell::text(value)])
                            .collect(),
                    )
                    .fonts(10.0, 10.0)
                    .padding(2.0)
                    .column(
                        0,
                        ColumnStyle {
                            bold: true,
                            color: Some(Swatch::Muted),
                            width: Some(40.0),
                            ..ColumnStyle::default()
                        },
                    ),
            ),
        ];

        let apps = top_apps(&device.app_usage, TOP_APPS_LIMIT);
        if !apps.is_empty() {
            blocks.push(Block::subheading("SOFTWARE SPECTRUM (TOP USAGE)"));
            blocks.push(Block::Table(
                Table::new(TableStyle::Striped)
                    .head(["APPLICATION", "DURATION", "PERCENTAGE"], Swatch::Muted)
                    .rows(
                        apps.iter()
                            .map(|app| {
                                vec![
                                    Cell::text(&app.name),
                                    Cell::text(format_seconds(app.seconds)),
                                    Cell::text(format_percent(app.share)),
                                ]
                            })
                            .collect(),
                    ),
            ));
        }

        let history = recent_history(&payload.history, HISTORY_LIMIT);
        if !history.is_empty() {
            blocks.push(Block::subheading("TELEMETRY ARCHIVE (7 DAYS)"));
            blocks.push(Block::Table(
                Table::new(TableStyle::Striped)
                    .head(
                        ["DATE", "AVG PERFORMANCE", "RUNTIME", "PEAK SIGNAL"],
                        Swatch::Navy,
                    )
                    .rows(
                        history
                            .iter()
                            .map(|entry| {
                                vec![
                                    Cell::text(
                                        entry
                                            .date()
                                            .map(|d| d.format("%Y-%m-%d").to_string())
                                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                                    ),
                                    Cell::text(format_percent(entry.score())),
                                    Cell::text(format_minutes(entry.runtime_minutes)),
                                    Cell::text("STABLE"),
                                ]
                            })
                            .collect(),
                    ),
            ));
        }

        blocks
    }

    fn clock(&self, at: Option<DateTime<Utc>>) -> String {
        at.map(|ts| format_clock(&ts.with_timezone(&self.offset)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::ReportKind;
    use serde_json::json;

    fn build(kind: ReportKind, payload: serde_json::Value, context: Option<&str>) -> Vec<Block> {
        let payload = ReportPayload::resolve(kind, payload).unwrap();
        let request = ReportRequest::new(payload, context.map(str::to_string));
        SectionBuilder::new(FixedOffset::east_opt(0).unwrap()).build(&request)
    }

    fn summary_value<'a>(blocks: &'a [Block], label: &str) -> &'a str {
        blocks
            .iter()
            .filter_map(Block::as_summary)
            .flatten()
            .find(|item| item.label == label)
            .map(|item| item.value.as_str())
            .unwrap_or_else(|| panic!("no summary item {}", label))
    }

    fn tables(blocks: &[Block]) -> Vec<&Table> {
        blocks.iter().filter_map(Block::as_table).collect()
    }

    fn column(table: &Table, index: usize) -> Vec<&str> {
        table.rows.iter().map(|r| r[index].text.as_str()).collect()
    }

    // ===========================================
    // Global
    // ===========================================

    #[test]
    fn test_global_totals_and_rows() {
        let blocks = build(
            ReportKind::Global,
            json!({"locations": [
                {"city": "pune", "total_labs": 3, "total_pcs": 40, "online": 30, "offline": 10, "avg_performance": 71.26},
                {"city": "delhi", "total_labs": "2", "total_pcs": 10, "online": 1, "offline": 9},
                {"city": "agra", "total_labs": null, "total_pcs": 5, "online": 0, "offline": 5, "avg_performance": "55.56"}
            ]}),
            None,
        );

        assert_eq!(summary_value(&blocks, "TOTAL CITIES"), "3");
        assert_eq!(summary_value(&blocks, "TOTAL LABS"), "5");
        assert_eq!(summary_value(&blocks, "TOTAL SYSTEMS"), "55");
        assert_eq!(summary_value(&blocks, "LIVE NODES"), "31");

        let table = tables(&blocks)[0];
        assert_eq!(table.rows.len(), 3);
        assert_eq!(column(table, 0), vec!["PUNE", "DELHI", "AGRA"]);
        assert_eq!(column(table, 5), vec!["71.3%", "0.0%", "55.6%"]);
        assert_eq!(table.rows[0][3].color, Some(Swatch::Success));
        assert_eq!(table.rows[0][4].color, Some(Swatch::Danger));
    }

    // ===========================================
    // City
    // ===========================================

    #[test]
    fn test_city_weighted_health() {
        let blocks = build(
            ReportKind::City,
            json!({"labs": [
                {"lab_name": "Hall A", "avg_performance": 80, "total_pcs": 10, "online": 4},
                {"lab_name": "Hall B", "avg_performance": 60, "total_pcs": 5, "online": 0}
            ]}),
            Some("Pune"),
        );

        assert_eq!(summary_value(&blocks, "CITY HEALTH"), "73.3%");
        assert_eq!(summary_value(&blocks, "CITY NAME"), "PUNE");
        assert_eq!(summary_value(&blocks, "LABS ACTIVE"), "1 / 2");
        assert_eq!(summary_value(&blocks, "TOTAL NODES"), "15");
        assert!(blocks.contains(&Block::heading("LAB CLUSTER DETAILS: PUNE")));

        let table = tables(&blocks)[0];
        assert_eq!(table.head_fill, Swatch::Primary);
        assert_eq!(column(table, 4), vec!["800", "300"]);
        assert_eq!(column(table, 5), vec!["80.0%", "60.0%"]);
    }

    #[test]
    fn test_city_zero_pcs_health() {
        let blocks = build(
            ReportKind::City,
            json!({"labs": [{"lab_name": "Empty", "avg_performance": 90, "total_pcs": 0}]}),
            None,
        );
        assert_eq!(summary_value(&blocks, "CITY HEALTH"), "0.0%");
        assert_eq!(summary_value(&blocks, "CITY NAME"), "TOTAL SYSTEM");
        // The weighted average ignores the lab, its own row still shows the score
        assert_eq!(column(tables(&blocks)[0], 4), vec!["90"]);
    }

    #[test]
    fn test_city_name_falls_back_to_payload() {
        let blocks = build(ReportKind::City, json!({"city": "Nagpur", "labs": []}), None);
        assert_eq!(summary_value(&blocks, "CITY NAME"), "NAGPUR");
        assert_eq!(tables(&blocks)[0].rows.len(), 0);
    }

    // ===========================================
    // Lab and system
    // ===========================================

    #[test]
    fn test_lab_inventory() {
        let blocks = build(
            ReportKind::Lab,
            json!({
                "city": "Pune",
                "offline_7d": 2,
                "offline_30d": 1,
                "devices": [
                    {"pc_name": "pc-01", "system_id": "A1", "status": "online", "cpu_score": 42.46, "last_seen": "2024-05-01T10:30:15Z"},
                    {"system_id": "A2", "status": "offline", "cpu_score": "17.5"}
                ]
            }),
            Some("Main Hall A"),
        );

        assert_eq!(summary_value(&blocks, "LOCATION"), "PUNE / MAIN HALL A");
        assert_eq!(summary_value(&blocks, "TOTAL PC"), "2");
        assert_eq!(summary_value(&blocks, "ONLINE"), "1");
        assert_eq!(summary_value(&blocks, "OFFLINE"), "1");
        assert_eq!(summary_value(&blocks, "7+ DAYS OFFLINE"), "2");
        assert_eq!(summary_value(&blocks, "30+ DAYS OFFLINE"), "1");
        assert_eq!(summary_value(&blocks, "LAB HEALTH"), "30.0%");

        let table = tables(&blocks)[0];
        assert_eq!(table.style, TableStyle::Grid);
        assert_eq!(column(table, 0), vec!["PC-01", "STATION"]);
        assert_eq!(column(table, 2), vec!["ONLINE", "OFFLINE"]);
        assert_eq!(column(table, 3), vec!["42.5%", "17.5%"]);
        assert_eq!(column(table, 4), vec!["42", "18"]);
        assert_eq!(column(table, 5), vec!["10:30:15", "N/A"]);
        assert!(table.rows[0][2].bold);
    }

    #[test]
    fn test_lab_inventory_scores_round_half_up() {
        let blocks = build(
            ReportKind::Lab,
            json!({
                "devices": [
                    {"system_id": "B1", "status": "online", "cpu_score": 42.5},
                    {"system_id": "B2", "status": "online", "cpu_score": 12.25}
                ]
            }),
            Some("Annex"),
        );

        let table = tables(&blocks)[0];
        assert_eq!(column(table, 3), vec!["42.5%", "12.3%"]);
        assert_eq!(column(table, 4), vec!["43", "12"]);
    }

    #[test]
    fn test_lab_without_devices_shows_notice() {
        let blocks = build(
            ReportKind::Lab,
            json!({"lab_name": "Annex", "total_pcs": 8, "online": 3, "avg_performance": 61}),
            None,
        );
        assert_eq!(summary_value(&blocks, "LOCATION"), "NETWORK HUB / ANNEX");
        assert_eq!(summary_value(&blocks, "OFFLINE"), "5");
        assert_eq!(summary_value(&blocks, "LAB HEALTH"), "61.0%");
        assert!(tables(&blocks).is_empty());
        assert!(matches!(blocks.last(), Some(Block::Notice(_))));
    }

    #[test]
    fn test_system_scope_selects_branch() {
        let devices = build(
            ReportKind::System,
            json!({"devices": [{"system_id": "A1", "status": "online"}]}),
            None,
        );
        assert_eq!(summary_value(&devices, "LOCATION"), "NETWORK HUB / GLOBAL FLEET");

        let labs = build(
            ReportKind::System,
            json!({"labs": [{"lab_name": "Hall A", "total_pcs": 4, "online": 4}]}),
            Some("Pune"),
        );
        assert_eq!(summary_value(&labs, "CITY NAME"), "PUNE");
    }

    #[test]
    fn test_times_use_offset() {
        let payload = ReportPayload::resolve(
            ReportKind::Lab,
            json!({"devices": [{"system_id": "A1", "last_seen": "2024-05-01T10:30:15Z"}]}),
        )
        .unwrap();
        let request = ReportRequest::new(payload, None);
        let builder = SectionBuilder::new(FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        let blocks = builder.build(&request);
        assert_eq!(column(tables(&blocks)[0], 5), vec!["16:00:15"]);
    }

    // ===========================================
    // Station
    // ===========================================

    #[test]
    fn test_station_profile() {
        let blocks = build(
            ReportKind::Pc,
            json!({
                "system_id": "HW-1",
                "pc_name": "Station 1",
                "city": "pune",
                "isOnline": true,
                "runtime_minutes": 125,
                "cpu_score": 12.34,
                "app_usage": {"Chrome": 3600, "Word": 1800},
                "history": [
                    {"history_date": "2024-05-02", "avg_score": 40, "runtime_minutes": 61},
                    {"start_time": "2024-05-01T08:00:00Z", "avg_score": "35.5"}
                ]
            }),
            None,
        );

        assert_eq!(
            blocks[0],
            Block::Heading {
                text: "STATION PROFILE: STATION 1".to_string(),
                size: 18.0
            }
        );

        let all = tables(&blocks);
        let info = all[0];
        assert_eq!(info.style, TableStyle::Plain);
        let info_rows: Vec<(&str, &str)> = info
            .rows
            .iter()
            .map(|r| (r[0].text.as_str(), r[1].text.as_str()))
            .collect();
        assert!(info_rows.contains(&("System ID", "HW-1")));
        assert!(info_rows.contains(&("Region", "PUNE")));
        assert!(info_rows.contains(&("Facility", "N/A")));
        assert!(info_rows.contains(&("Current Status", "OPERATIONAL (ONLINE)")));
        assert!(info_rows.contains(&("Boot Time Today", "N/A")));
        assert!(info_rows.contains(&("Total Runtime", "2H 5M")));
        assert!(info_rows.contains(&("Health Score", "12.3% Units")));

        let apps = all[1];
        assert_eq!(column(apps, 0), vec!["Chrome", "Word"]);
        assert_eq!(column(apps, 1), vec!["1H 0M", "0H 30M"]);
        assert_eq!(column(apps, 2), vec!["66.7%", "33.3%"]);

        let history = all[2];
        assert_eq!(column(history, 0), vec!["2024-05-02", "2024-05-01"]);
        assert_eq!(column(history, 1), vec!["40.0%", "35.5%"]);
        assert_eq!(column(history, 2), vec!["1H 1M", "0H 0M"]);
    }

    #[test]
    fn test_station_without_usage_or_history() {
        let blocks = build(ReportKind::Pc, json!({"system_id": "HW-2", "status": "online"}), None);
        assert_eq!(tables(&blocks).len(), 1);
        assert!(!blocks.contains(&Block::subheading("SOFTWARE SPECTRUM (TOP USAGE)")));
        assert!(!blocks.contains(&Block::subheading("TELEMETRY ARCHIVE (7 DAYS)")));
    }

    #[test]
    fn test_station_history_capped() {
        let history: Vec<_> = (1..=9)
            .map(|d| json!({"history_date": format!("2024-05-0{}", d)}))
            .collect();
        let blocks = build(ReportKind::Pc, json!({"system_id": "HW-3", "history": history}), None);
        let all = tables(&blocks);
        assert_eq!(all.last().unwrap().rows.len(), 7);
    }
}
