use crate::domain::{HistorySnapshot, InventorySnapshot};
use async_trait::async_trait;
use common::domain::{DomainResult, InventoryApi, ScanHistoryQuery};
use std::fmt::Debug;
use std::sync::Arc;

/// Source of one kind of snapshot for a [`crate::domain::ReconciliationPoller`].
///
/// `fetch` either returns every part of the snapshot or fails; partial results
/// are never surfaced.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync + 'static {
    type Snapshot: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> DomainResult<Self::Snapshot>;
}

/// Reads devices, locations and device types concurrently
pub struct InventoryFetcher {
    api: Arc<dyn InventoryApi>,
}

impl InventoryFetcher {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SnapshotFetcher for InventoryFetcher {
    type Snapshot = InventorySnapshot;

    fn name(&self) -> &'static str {
        "inventory"
    }

    async fn fetch(&self) -> DomainResult<InventorySnapshot> {
        let (devices, locations, device_types) = tokio::try_join!(
            self.api.list_devices(),
            self.api.list_locations(),
            self.api.list_device_types()
        )?;

        Ok(InventorySnapshot {
            devices,
            locations,
            device_types,
        })
    }
}

/// Reads the newest window of scan results
pub struct HistoryFetcher {
    api: Arc<dyn InventoryApi>,
    query: ScanHistoryQuery,
}

impl HistoryFetcher {
    pub fn new(api: Arc<dyn InventoryApi>, limit: u32) -> Self {
        Self {
            api,
            query: ScanHistoryQuery {
                limit,
                ..ScanHistoryQuery::default()
            },
        }
    }
}

#[async_trait]
impl SnapshotFetcher for HistoryFetcher {
    type Snapshot = HistorySnapshot;

    fn name(&self) -> &'static str {
        "history"
    }

    async fn fetch(&self) -> DomainResult<HistorySnapshot> {
        let entries = self.api.list_scan_results(self.query).await?;
        Ok(HistorySnapshot { entries })
    }
}
