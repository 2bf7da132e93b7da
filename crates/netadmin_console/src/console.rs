use anyhow::anyhow;
use common::domain::InventoryApi;
use inventory_sync::{
    recent_activity, DashboardSummary, HistoryFetcher, HistorySnapshot, InventoryFetcher,
    InventorySnapshot, PollScheduler, Reachability, ReconciliationPoller, SyncState,
};
use netadmin_runner::AppProcess;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct NetadminConsoleConfig {
    pub history_poll_interval: Duration,
    pub scan_history_limit: u32,
    pub recent_activity_count: usize,
}

/// Inventory and scan history views of a signed-in session
pub struct NetadminConsole {
    inventory: Arc<ReconciliationPoller<InventoryFetcher>>,
    history: Arc<ReconciliationPoller<HistoryFetcher>>,
    session_scope: CancellationToken,
    history_poll_interval: Duration,
    recent_activity_count: usize,
}

impl NetadminConsole {
    pub fn new(
        api: Arc<dyn InventoryApi>,
        session_scope: CancellationToken,
        config: NetadminConsoleConfig,
    ) -> Self {
        debug!("initializing netadmin console module");
        Self {
            inventory: Arc::new(ReconciliationPoller::new(InventoryFetcher::new(Arc::clone(
                &api,
            )))),
            history: Arc::new(ReconciliationPoller::new(HistoryFetcher::new(
                api,
                config.scan_history_limit,
            ))),
            session_scope,
            history_poll_interval: config.history_poll_interval,
            recent_activity_count: config.recent_activity_count,
        }
    }

    /// Load the inventory once. A failure leaves the error banner raised and
    /// is reported by the snapshot reporter.
    pub async fn activate(&self) {
        if let Err(e) = self
            .inventory
            .refresh_within(false, &self.session_scope)
            .await
        {
            warn!(error = %e, "initial inventory load failed");
        }
    }

    pub fn into_runner_processes(self) -> Vec<(&'static str, AppProcess)> {
        let history_process: AppProcess = Box::new({
            let history = Arc::clone(&self.history);
            let session_scope = self.session_scope.clone();
            let period = self.history_poll_interval;
            move |ctx| Box::pin(run_history_poller(history, period, session_scope, ctx))
        });

        let reporter_process: AppProcess = Box::new({
            let inventory = self.inventory;
            let history = self.history;
            let count = self.recent_activity_count;
            move |ctx| Box::pin(run_snapshot_reporter(inventory, history, count, ctx))
        });

        vec![
            ("history_poller", history_process),
            ("snapshot_reporter", reporter_process),
        ]
    }
}

/// Poll scan history until shutdown. Ends with an error if the session is
/// revoked underneath it.
async fn run_history_poller(
    history: Arc<ReconciliationPoller<HistoryFetcher>>,
    period: Duration,
    session_scope: CancellationToken,
    ctx: CancellationToken,
) -> anyhow::Result<()> {
    let handle = PollScheduler::start(history, period, &session_scope);

    tokio::select! {
        _ = ctx.cancelled() => {
            handle.stop().await;
            Ok(())
        }
        _ = session_scope.cancelled() => {
            handle.stop().await;
            Err(anyhow!("session ended, sign in again"))
        }
    }
}

/// Log the dashboard digest whenever either snapshot changes
async fn run_snapshot_reporter(
    inventory: Arc<ReconciliationPoller<InventoryFetcher>>,
    history: Arc<ReconciliationPoller<HistoryFetcher>>,
    recent_activity_count: usize,
    ctx: CancellationToken,
) -> anyhow::Result<()> {
    let mut inventory: watch::Receiver<SyncState<InventorySnapshot>> = inventory.subscribe();
    let mut history: watch::Receiver<SyncState<HistorySnapshot>> = history.subscribe();
    report_inventory(&inventory.borrow_and_update());
    report_history(&history.borrow_and_update(), recent_activity_count);

    loop {
        tokio::select! {
            _ = ctx.cancelled() => return Ok(()),
            changed = inventory.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                report_inventory(&inventory.borrow_and_update());
            }
            changed = history.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                report_history(&history.borrow_and_update(), recent_activity_count);
            }
        }
    }
}

fn report_inventory(state: &SyncState<InventorySnapshot>) {
    if let Some(banner) = &state.error_banner {
        warn!(banner = %banner, "inventory unavailable");
    }
    let Some(snapshot) = state.current() else {
        return;
    };

    let summary = DashboardSummary::from_devices(&snapshot.devices);
    info!(
        total = summary.total,
        online = summary.online,
        offline = summary.offline,
        locations = snapshot.locations.len(),
        device_types = snapshot.device_types.len(),
        "inventory snapshot"
    );
    for device in &snapshot.devices {
        debug!(
            device_id = device.id,
            name = %device.name,
            ip_address = %device.ip_address,
            status = Reachability::of(device).label(),
            "device"
        );
    }
}

fn report_history(state: &SyncState<HistorySnapshot>, count: usize) {
    let Some(snapshot) = state.current() else {
        return;
    };

    for entry in recent_activity(&snapshot.entries, count) {
        let device = entry
            .device
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("unknown device");
        info!(
            scan_id = entry.scan.id,
            device = %device,
            status = Reachability::from_status(entry.scan.status).label(),
            timestamp = %entry.scan.timestamp,
            response_time_ms = entry.scan.response_time_ms,
            "recent activity"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::domain::{MockInventoryApi, ScanLogEntry, ScanResult};

    fn console(api: MockInventoryApi, session_scope: CancellationToken) -> NetadminConsole {
        NetadminConsole::new(
            Arc::new(api),
            session_scope,
            NetadminConsoleConfig {
                history_poll_interval: Duration::from_secs(5),
                scan_history_limit: 10,
                recent_activity_count: 3,
            },
        )
    }

    fn history_api() -> MockInventoryApi {
        let mut api = MockInventoryApi::new();
        api.expect_list_scan_results().returning(|_| {
            Ok(vec![ScanLogEntry {
                scan: ScanResult {
                    id: 1,
                    device_id: 1,
                    status: true,
                    timestamp: Utc::now(),
                    response_time_ms: Some(4),
                    log_message: None,
                },
                device: None,
            }])
        });
        api
    }

    #[tokio::test]
    async fn test_activate_loads_inventory() {
        let mut api = MockInventoryApi::new();
        api.expect_list_devices().times(1).returning(|| Ok(vec![]));
        api.expect_list_locations().times(1).returning(|| Ok(vec![]));
        api.expect_list_device_types().times(1).returning(|| Ok(vec![]));
        let console = console(api, CancellationToken::new());

        console.activate().await;

        assert!(console.inventory.current().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_poller_stops_on_shutdown() {
        let console = console(history_api(), CancellationToken::new());
        let history = Arc::clone(&console.history);
        let mut processes = console.into_runner_processes();
        let (name, process) = processes.remove(0);
        assert_eq!(name, "history_poller");

        let ctx = CancellationToken::new();
        let task = tokio::spawn(process(ctx.clone()));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(history.current().unwrap().entries.len(), 1);

        ctx.cancel();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_poller_fails_when_session_ends() {
        let session_scope = CancellationToken::new();
        let console = console(history_api(), session_scope.clone());
        let (_, process) = console.into_runner_processes().remove(0);

        let task = tokio::spawn(process(CancellationToken::new()));
        tokio::time::sleep(Duration::from_secs(1)).await;
        session_scope.cancel();

        assert!(task.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_reporter_exits_on_shutdown() {
        let console = console(MockInventoryApi::new(), CancellationToken::new());
        let (name, process) = console.into_runner_processes().remove(1);
        assert_eq!(name, "snapshot_reporter");

        let ctx = CancellationToken::new();
        ctx.cancel();
        assert!(process(ctx).await.is_ok());
    }
}
