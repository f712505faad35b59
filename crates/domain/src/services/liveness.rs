//! Station liveness derivation.
//!
//! The backend's `status` label lags reality: a station that lost power keeps
//! reporting `online` until a sweep runs. Callers therefore treat a station as
//! live only while its last heartbeat is recent relative to a reference clock.

use chrono::{DateTime, Duration, Utc};

use crate::models::{DeviceRecord, DeviceStatus};

/// Heartbeat freshness window, in seconds.
pub const LIVENESS_WINDOW_SECS: i64 = 60;

/// Returns true when the station is labeled online and was seen less than
/// [`LIVENESS_WINDOW_SECS`] before `reference`.
pub fn is_station_online(
    status: DeviceStatus,
    last_seen: Option<DateTime<Utc>>,
    reference: DateTime<Utc>,
) -> bool {
    let Some(last_seen) = last_seen else {
        return false;
    };
    status.is_online() && reference - last_seen < Duration::seconds(LIVENESS_WINDOW_SECS)
}

/// Stamps the derived liveness flag onto a station record.
///
/// `server_time` is preferred as the reference clock; `now` is used when the
/// backend did not supply one.
pub fn mark_liveness(
    device: &mut DeviceRecord,
    server_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) {
    let reference = server_time.unwrap_or(now);
    device.is_online = Some(is_station_online(
        device.status,
        device.last_seen,
        reference,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::seconds(secs as i64)
    }

    #[test]
    fn test_recent_heartbeat_is_online() {
        assert!(is_station_online(DeviceStatus::Online, Some(at(0)), at(59)));
    }

    #[test]
    fn test_window_is_exclusive() {
        assert!(!is_station_online(DeviceStatus::Online, Some(at(0)), at(60)));
    }

    #[test]
    fn test_offline_label_wins() {
        assert!(!is_station_online(DeviceStatus::Offline, Some(at(0)), at(1)));
    }

    #[test]
    fn test_missing_last_seen_is_offline() {
        assert!(!is_station_online(DeviceStatus::Online, None, at(0)));
    }

    #[test]
    fn test_mark_liveness_prefers_server_time() {
        let mut device = DeviceRecord {
            status: DeviceStatus::Online,
            last_seen: Some(at(0)),
            ..DeviceRecord::default()
        };

        // Local clock says stale, server clock says fresh.
        mark_liveness(&mut device, Some(at(30)), at(600));
        assert_eq!(device.is_online, Some(true));

        mark_liveness(&mut device, None, at(600));
        assert_eq!(device.is_online, Some(false));
    }
}
