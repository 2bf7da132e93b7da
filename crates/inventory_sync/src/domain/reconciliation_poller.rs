use crate::domain::{SnapshotFetcher, SyncState};
use common::domain::DomainResult;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

/// Outcome of a refresh that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome<T> {
    /// The fetched snapshot is now current. Equal content leaves the published
    /// state untouched.
    Applied(Arc<T>),
    /// A background refresh found another refresh outstanding and did nothing
    Skipped,
    /// The owning scope was cancelled while the fetch was in flight; the
    /// result was dropped
    Discarded,
}

impl<T> RefreshOutcome<T> {
    pub fn snapshot(&self) -> Option<&Arc<T>> {
        match self {
            RefreshOutcome::Applied(snapshot) => Some(snapshot),
            RefreshOutcome::Skipped | RefreshOutcome::Discarded => None,
        }
    }
}

/// Keeps a local snapshot consistent with the remote service.
///
/// A refresh fetches the whole snapshot and swaps it in as a unit. Background
/// refreshes are silent on failure and keep the previous snapshot; foreground
/// refreshes surface failures as an error banner and mark the snapshot
/// unavailable. At most one refresh runs at a time: background requests skip
/// when one is outstanding, foreground requests wait their turn.
pub struct ReconciliationPoller<F: SnapshotFetcher> {
    fetcher: F,
    state: watch::Sender<SyncState<F::Snapshot>>,
    refresh_gate: Mutex<()>,
}

impl<F: SnapshotFetcher> ReconciliationPoller<F> {
    pub fn new(fetcher: F) -> Self {
        let (state, _) = watch::channel(SyncState::loading());
        Self {
            fetcher,
            state,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Name of the snapshot source, for logs
    pub fn source(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Watch the published state. Receivers are only notified when it changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState<F::Snapshot>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SyncState<F::Snapshot> {
        self.state.borrow().clone()
    }

    /// The snapshot currently shown, if any
    pub fn current(&self) -> Option<Arc<F::Snapshot>> {
        self.state.borrow().current().cloned()
    }

    /// Fetch and apply a fresh snapshot. Background failures are logged only.
    pub async fn refresh(&self, background: bool) -> DomainResult<RefreshOutcome<F::Snapshot>> {
        self.refresh_inner(background, None).await
    }

    /// Same as [`Self::refresh`], but a result arriving after `scope` is
    /// cancelled is discarded rather than applied
    pub async fn refresh_within(
        &self,
        background: bool,
        scope: &CancellationToken,
    ) -> DomainResult<RefreshOutcome<F::Snapshot>> {
        self.refresh_inner(background, Some(scope)).await
    }

    #[instrument(skip(self, scope), fields(source = self.fetcher.name()))]
    async fn refresh_inner(
        &self,
        background: bool,
        scope: Option<&CancellationToken>,
    ) -> DomainResult<RefreshOutcome<F::Snapshot>> {
        let _gate = if background {
            match self.refresh_gate.try_lock() {
                Ok(gate) => gate,
                Err(_) => {
                    debug!("refresh already outstanding, skipping background tick");
                    return Ok(RefreshOutcome::Skipped);
                }
            }
        } else {
            self.refresh_gate.lock().await
        };

        let fetched = self.fetcher.fetch().await;

        if scope.is_some_and(|s| s.is_cancelled()) {
            debug!("scope ended while refreshing, discarding result");
            return Ok(RefreshOutcome::Discarded);
        }

        match fetched {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let changed = self.state.send_if_modified(|state| {
                    let next = SyncState::ready(Arc::clone(&snapshot));
                    if *state == next {
                        return false;
                    }
                    *state = next;
                    true
                });
                debug!(changed, "refresh applied");
                Ok(RefreshOutcome::Applied(snapshot))
            }
            Err(e) if background => {
                warn!(error = %e, "background refresh failed, keeping previous snapshot");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "refresh failed");
                let banner = e.user_message();
                self.state.send_if_modified(|state| {
                    let next = SyncState::unavailable(banner);
                    if *state == next {
                        return false;
                    }
                    *state = next;
                    true
                });
                Err(e)
            }
        }
    }
}
