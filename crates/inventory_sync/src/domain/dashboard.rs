use crate::domain::Reachability;
use common::domain::{Device, ScanLogEntry};

/// Device counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
}

impl DashboardSummary {
    pub fn from_devices(devices: &[Device]) -> Self {
        let online = devices
            .iter()
            .filter(|device| Reachability::of(device).is_online())
            .count();
        Self {
            total: devices.len(),
            online,
            offline: devices.len() - online,
        }
    }
}

/// The `count` newest scan log entries, newest first
pub fn recent_activity(entries: &[ScanLogEntry], count: usize) -> Vec<ScanLogEntry> {
    let mut recent = entries.to_vec();
    recent.sort_by(|a, b| {
        b.scan
            .timestamp
            .cmp(&a.scan.timestamp)
            .then_with(|| b.scan.id.cmp(&a.scan.id))
    });
    recent.truncate(count);
    recent
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::domain::ScanResult;

    fn scan(id: i64, status: bool, minute: i64) -> ScanResult {
        ScanResult {
            id,
            device_id: 1,
            status,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                + Duration::minutes(minute),
            response_time_ms: None,
            log_message: None,
        }
    }

    fn device(id: i64, history: Vec<ScanResult>) -> Device {
        Device {
            id,
            name: format!("dev-{}", id),
            ip_address: format!("10.0.0.{}", id),
            mac_address: None,
            location_id: 1,
            device_type_id: 1,
            location: None,
            device_type: None,
            scan_results: history,
        }
    }

    #[test]
    fn test_summary_counts() {
        let devices = vec![
            device(1, vec![scan(1, true, 0)]),
            device(2, vec![scan(2, true, 0), scan(3, false, 1)]),
            device(3, vec![]),
        ];

        let summary = DashboardSummary::from_devices(&devices);
        assert_eq!(
            summary,
            DashboardSummary {
                total: 3,
                online: 1,
                offline: 2
            }
        );
    }

    #[test]
    fn test_empty_inventory() {
        assert_eq!(DashboardSummary::from_devices(&[]), DashboardSummary::default());
    }

    #[test]
    fn test_recent_activity_newest_first() {
        let entries: Vec<ScanLogEntry> = [(1, 3), (2, 9), (3, 1), (4, 7)]
            .into_iter()
            .map(|(id, minute)| ScanLogEntry {
                scan: scan(id, true, minute),
                device: None,
            })
            .collect();

        let recent = recent_activity(&entries, 2);
        let ids: Vec<i64> = recent.iter().map(|e| e.scan.id).collect();
        assert_eq!(ids, vec![2, 4]);

        assert_eq!(recent_activity(&entries, 10).len(), 4);
    }
}
