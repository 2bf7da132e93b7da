use common::domain::{Device, DeviceType, Location, ScanLogEntry};
use std::sync::Arc;

/// Devices, locations and device types fetched together in one refresh cycle.
///
/// The three collections are replaced as a unit; readers never see devices
/// from one cycle next to locations from another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub devices: Vec<Device>,
    pub locations: Vec<Location>,
    pub device_types: Vec<DeviceType>,
}

impl InventorySnapshot {
    pub fn device(&self, device_id: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    pub fn location(&self, location_id: i64) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == location_id)
    }

    pub fn device_type(&self, device_type_id: i64) -> Option<&DeviceType> {
        self.device_types.iter().find(|t| t.id == device_type_id)
    }
}

/// Most recent scan results, newest first as returned by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub entries: Vec<ScanLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotState<T> {
    /// No refresh has completed yet
    Loading,
    Ready(Arc<T>),
    /// The last foreground refresh failed and nothing may be shown
    Unavailable,
}

/// What a view bound to a poller renders: the snapshot plus the error banner
/// raised by a failed foreground refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState<T> {
    pub snapshot: SnapshotState<T>,
    pub error_banner: Option<String>,
}

impl<T> SyncState<T> {
    pub fn loading() -> Self {
        Self {
            snapshot: SnapshotState::Loading,
            error_banner: None,
        }
    }

    pub fn ready(snapshot: Arc<T>) -> Self {
        Self {
            snapshot: SnapshotState::Ready(snapshot),
            error_banner: None,
        }
    }

    pub fn unavailable(error_banner: String) -> Self {
        Self {
            snapshot: SnapshotState::Unavailable,
            error_banner: Some(error_banner),
        }
    }

    pub fn current(&self) -> Option<&Arc<T>> {
        match &self.snapshot {
            SnapshotState::Ready(snapshot) => Some(snapshot),
            SnapshotState::Loading | SnapshotState::Unavailable => None,
        }
    }
}
