use crate::domain::{ReconciliationPoller, SnapshotFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Drives periodic background refreshes of a poller while a view is active
pub struct PollScheduler;

impl PollScheduler {
    /// Refresh once in the foreground, then in the background every `period`.
    ///
    /// Polling stops when the returned handle is stopped or dropped, or when
    /// `session_scope` is cancelled. Results of a refresh still in flight at
    /// that point are discarded. Ticks missed while a refresh is running are
    /// skipped rather than replayed.
    pub fn start<F: SnapshotFetcher>(
        poller: Arc<ReconciliationPoller<F>>,
        period: Duration,
        session_scope: &CancellationToken,
    ) -> PollHandle {
        let scope = session_scope.child_token();
        let task_scope = scope.clone();
        let period = period.max(Duration::from_millis(1));

        info!(
            source = poller.source(),
            period_ms = period.as_millis() as u64,
            "starting poll loop"
        );
        let join_handle = tokio::spawn(run_poll_loop(poller, period, task_scope));

        PollHandle {
            scope,
            join_handle: Some(join_handle),
        }
    }
}

async fn run_poll_loop<F: SnapshotFetcher>(
    poller: Arc<ReconciliationPoller<F>>,
    period: Duration,
    scope: CancellationToken,
) {
    if scope.is_cancelled() {
        return;
    }
    if let Err(e) = poller.refresh_within(false, &scope).await {
        debug!(source = poller.source(), error = %e, "initial refresh failed");
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = scope.cancelled() => {
                debug!(source = poller.source(), "poll loop stopped");
                break;
            }
            _ = ticker.tick() => {
                // Failures are logged by the poller and leave the snapshot as is
                let _ = poller.refresh_within(true, &scope).await;
            }
        }
    }
}

/// Owns a running poll loop; dropping it stops the loop
pub struct PollHandle {
    scope: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling and wait for the loop to exit. A refresh in flight is
    /// allowed to finish but its result is discarded.
    pub async fn stop(mut self) {
        self.scope.cancel();
        if let Some(join_handle) = self.join_handle.take() {
            if let Err(e) = join_handle.await {
                error!("poll loop panicked: {:?}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map_or(true, |join_handle| join_handle.is_finished())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::domain::DomainResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_secs(5);

    #[derive(Default)]
    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SnapshotFetcher for CountingFetcher {
        type Snapshot = usize;

        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self) -> DomainResult<usize> {
            Ok(self.calls.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn poller() -> (Arc<ReconciliationPoller<CountingFetcher>>, Arc<AtomicUsize>) {
        let fetcher = CountingFetcher::default();
        let calls = Arc::clone(&fetcher.calls);
        (Arc::new(ReconciliationPoller::new(fetcher)), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_start_and_every_period() {
        let (poller, calls) = poller();
        let session = CancellationToken::new();

        let handle = PollScheduler::start(Arc::clone(&poller), PERIOD, &session);
        tokio::time::sleep(PERIOD * 3 + Duration::from_secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(poller.current().as_deref(), Some(&4));
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_polling() {
        let (poller, calls) = poller();
        let session = CancellationToken::new();

        let handle = PollScheduler::start(poller, PERIOD, &session);
        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        handle.stop().await;
        let after_stop = calls.load(Ordering::SeqCst);

        tokio::time::sleep(PERIOD * 4).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
        assert!(!session.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_halts_polling() {
        let (poller, calls) = poller();
        let session = CancellationToken::new();

        let handle = PollScheduler::start(poller, PERIOD, &session);
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);
        let after_drop = calls.load(Ordering::SeqCst);

        tokio::time::sleep(PERIOD * 4).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_revocation_halts_polling() {
        let (poller, calls) = poller();
        let session = CancellationToken::new();

        let handle = PollScheduler::start(poller, PERIOD, &session);
        tokio::time::sleep(Duration::from_secs(1)).await;
        session.cancel();
        tokio::time::sleep(PERIOD * 4).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_session_never_polls() {
        let (poller, calls) = poller();
        let session = CancellationToken::new();
        session.cancel();

        let handle = PollScheduler::start(poller, PERIOD, &session);
        tokio::time::sleep(PERIOD * 2).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(handle.is_finished());
    }
}
