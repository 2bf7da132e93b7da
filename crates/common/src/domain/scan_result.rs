use crate::domain::{flexible_timestamp, DeviceSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reachability check recorded by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: i64,
    pub device_id: i64,
    pub status: bool,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub response_time_ms: Option<i64>,
    #[serde(default)]
    pub log_message: Option<String>,
}

/// Scan history row: a scan result joined with the device it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLogEntry {
    #[serde(flatten)]
    pub scan: ScanResult,
    #[serde(default)]
    pub device: Option<DeviceSummary>,
}
