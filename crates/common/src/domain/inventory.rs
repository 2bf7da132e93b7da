use crate::domain::{Device, DeviceInput, DeviceType, DomainResult, Location, ScanLogEntry};
use async_trait::async_trait;
use serde::Deserialize;

/// Bearer token issued by the inventory service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Paging window for the scan history listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHistoryQuery {
    pub skip: u32,
    pub limit: u32,
}

impl Default for ScanHistoryQuery {
    fn default() -> Self {
        Self { skip: 0, limit: 50 }
    }
}

/// Operations offered by the remote inventory service.
/// The HTTP transport in `crate::http` implements this trait.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// List all devices with their locations, types and scan history
    async fn list_devices(&self) -> DomainResult<Vec<Device>>;

    /// List all locations
    async fn list_locations(&self) -> DomainResult<Vec<Location>>;

    /// List all device types
    async fn list_device_types(&self) -> DomainResult<Vec<DeviceType>>;

    /// List scan results joined with their device, newest first
    async fn list_scan_results(&self, query: ScanHistoryQuery) -> DomainResult<Vec<ScanLogEntry>>;

    /// Create a device
    async fn create_device(&self, input: DeviceInput) -> DomainResult<Device>;

    /// Replace the fields of an existing device
    async fn update_device(&self, device_id: i64, input: DeviceInput) -> DomainResult<Device>;

    /// Delete a device
    async fn delete_device(&self, device_id: i64) -> DomainResult<()>;

    /// Exchange operator credentials for a bearer token
    async fn authenticate(&self, email: &str, password: &str) -> DomainResult<AccessToken>;
}
