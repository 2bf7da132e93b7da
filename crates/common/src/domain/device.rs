use crate::domain::{DeviceType, Location, ScanResult};
use serde::{Deserialize, Serialize};

/// Device record as held by the inventory service.
///
/// `scan_results` is ordered oldest first; the service appends new checks at
/// the end and the client never rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub ip_address: String,
    #[serde(default)]
    pub mac_address: Option<String>,
    pub location_id: i64,
    pub device_type_id: i64,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub scan_results: Vec<ScanResult>,
}

/// Payload for creating or updating a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInput {
    pub name: String,
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    pub location_id: i64,
    pub device_type_id: i64,
}

/// Device fields joined onto a scan log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub id: i64,
    pub name: String,
    pub ip_address: String,
}
