use common::domain::{Device, ScanLogEntry};

// Name matches ignore case; addresses match as typed.
fn matches(name: &str, ip_address: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase()) || ip_address.contains(term)
}

/// Devices whose name or address contains `term`. A blank term matches all.
pub fn search_devices<'a>(devices: &'a [Device], term: &str) -> Vec<&'a Device> {
    let term = term.trim();
    devices
        .iter()
        .filter(|device| term.is_empty() || matches(&device.name, &device.ip_address, term))
        .collect()
}

/// Scan log entries whose device name or address contains `term`.
/// Entries without device details only match a blank term.
pub fn search_scan_log<'a>(entries: &'a [ScanLogEntry], term: &str) -> Vec<&'a ScanLogEntry> {
    let term = term.trim();
    entries
        .iter()
        .filter(|entry| {
            term.is_empty()
                || entry
                    .device
                    .as_ref()
                    .is_some_and(|device| matches(&device.name, &device.ip_address, term))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::domain::{DeviceSummary, ScanResult};

    fn device(id: i64, name: &str, ip_address: &str) -> Device {
        Device {
            id,
            name: name.to_string(),
            ip_address: ip_address.to_string(),
            mac_address: None,
            location_id: 1,
            device_type_id: 1,
            location: None,
            device_type: None,
            scan_results: vec![],
        }
    }

    fn entry(id: i64, device: Option<(&str, &str)>) -> ScanLogEntry {
        ScanLogEntry {
            scan: ScanResult {
                id,
                device_id: 1,
                status: true,
                timestamp: Utc::now(),
                response_time_ms: None,
                log_message: None,
            },
            device: device.map(|(name, ip_address)| DeviceSummary {
                id: 1,
                name: name.to_string(),
                ip_address: ip_address.to_string(),
            }),
        }
    }

    #[test]
    fn test_search_devices_by_name_or_address() {
        let devices = vec![
            device(1, "Office Printer", "192.168.1.10"),
            device(2, "Core Switch", "10.0.0.1"),
        ];

        let hits = search_devices(&devices, "printer");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        let hits = search_devices(&devices, "10.0.0");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        assert_eq!(search_devices(&devices, "  ").len(), 2);
        assert!(search_devices(&devices, "router").is_empty());
    }

    #[test]
    fn test_search_scan_log() {
        let entries = vec![
            entry(1, Some(("PR1", "192.168.1.10"))),
            entry(2, Some(("SW1", "10.0.0.1"))),
            entry(3, None),
        ];

        let hits = search_scan_log(&entries, "pr1");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].scan.id, 1);

        assert_eq!(search_scan_log(&entries, "").len(), 3);
    }
}
