use crate::domain::{DeviceForm, InventoryFetcher, ReconciliationPoller, WorkflowState};
use common::domain::{Device, DeviceInput, DomainError, DomainResult, InventoryApi};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Workflow state plus the error raised by the last failed submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowView {
    pub state: WorkflowState,
    pub error: Option<String>,
}

/// Serializes device mutations through [`WorkflowState`].
///
/// A transition holds the controller's gate until it finishes, including the
/// remote call, so a second action arriving meanwhile fails with
/// [`DomainError::WorkflowBusy`]. Successful mutations trigger a foreground
/// inventory refresh before returning to idle.
///
/// The controller is bound to one session scope. Once that scope is cancelled
/// any open workflow is abandoned and new ones are refused.
pub struct WorkflowController {
    api: Arc<dyn InventoryApi>,
    inventory: Arc<ReconciliationPoller<InventoryFetcher>>,
    session_scope: CancellationToken,
    gate: Mutex<()>,
    view: watch::Sender<WorkflowView>,
}

impl WorkflowController {
    pub fn new(
        api: Arc<dyn InventoryApi>,
        inventory: Arc<ReconciliationPoller<InventoryFetcher>>,
        session_scope: CancellationToken,
    ) -> Self {
        let (view, _) = watch::channel(WorkflowView::default());
        Self {
            api,
            inventory,
            session_scope,
            gate: Mutex::new(()),
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowView> {
        self.view.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.expire_if_signed_out();
        self.view.borrow().state.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.expire_if_signed_out();
        self.view.borrow().error.clone()
    }

    /// Idle → Creating
    pub fn start_add(&self) -> DomainResult<()> {
        self.begin("add a device", WorkflowState::Creating)
    }

    /// Idle → Editing(device)
    pub fn start_edit(&self, device: Device) -> DomainResult<()> {
        self.begin("edit a device", WorkflowState::Editing(device))
    }

    /// Idle → Deleting(device)
    pub fn start_delete(&self, device: Device) -> DomainResult<()> {
        self.begin("delete a device", WorkflowState::Deleting(device))
    }

    /// Any non-idle state → Idle, without touching the remote service
    pub fn cancel(&self) -> DomainResult<()> {
        let _gate = self.try_gate()?;
        let previous = self.state();
        if !previous.is_idle() {
            debug!(from = previous.name(), "workflow cancelled");
        }
        self.publish(WorkflowState::Idle, None);
        Ok(())
    }

    /// Submit the add or edit form.
    ///
    /// Validation failures keep the current state so the operator can correct
    /// the form. On success the inventory is refreshed and the workflow returns
    /// to idle.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &DeviceForm) -> DomainResult<Device> {
        let _gate = self.try_gate()?;
        self.ensure_session()?;
        let state = self.state();

        let result = match &state {
            WorkflowState::Creating => match self.resolve(form) {
                Ok(input) => self.api.create_device(input).await,
                Err(e) => Err(e),
            },
            WorkflowState::Editing(device) => match self.resolve(form) {
                Ok(input) => self.api.update_device(device.id, input).await,
                Err(e) => Err(e),
            },
            WorkflowState::Idle | WorkflowState::Deleting(_) => {
                return Err(invalid_transition(&state, "submit a device form"));
            }
        };

        match result {
            Ok(device) => {
                info!(device_id = device.id, from = state.name(), "device saved");
                self.finish().await;
                Ok(device)
            }
            Err(e) => Err(self.fail(&state, e)),
        }
    }

    /// Deleting(device) → Idle once the service confirms the deletion
    #[instrument(skip(self))]
    pub async fn confirm_delete(&self) -> DomainResult<()> {
        let _gate = self.try_gate()?;
        self.ensure_session()?;
        let state = self.state();

        let WorkflowState::Deleting(device) = &state else {
            return Err(invalid_transition(&state, "confirm a deletion"));
        };

        match self.api.delete_device(device.id).await {
            Ok(()) => {
                info!(device_id = device.id, "device deleted");
                self.finish().await;
                Ok(())
            }
            Err(e) => Err(self.fail(&state, e)),
        }
    }

    fn begin(&self, action: &str, next: WorkflowState) -> DomainResult<()> {
        let _gate = self.try_gate()?;
        self.ensure_session()?;
        let state = self.state();
        if !state.is_idle() {
            return Err(invalid_transition(&state, action));
        }
        debug!(to = next.name(), "workflow started");
        self.publish(next, None);
        Ok(())
    }

    /// Reset to idle if the session this controller serves has ended.
    /// Returns true when the session is gone.
    fn expire_if_signed_out(&self) -> bool {
        if !self.session_scope.is_cancelled() {
            return false;
        }
        let expired = session_ended();
        let message = expired.user_message();
        self.view.send_if_modified(|view| {
            if view.state.is_idle() {
                return false;
            }
            warn!(from = view.state.name(), "session ended, abandoning workflow");
            *view = WorkflowView {
                state: WorkflowState::Idle,
                error: Some(message),
            };
            true
        });
        true
    }

    fn ensure_session(&self) -> DomainResult<()> {
        if self.expire_if_signed_out() {
            return Err(session_ended());
        }
        Ok(())
    }

    fn try_gate(&self) -> DomainResult<MutexGuard<'_, ()>> {
        self.gate.try_lock().map_err(|_| DomainError::WorkflowBusy)
    }

    fn resolve(&self, form: &DeviceForm) -> DomainResult<DeviceInput> {
        let snapshot = self.inventory.current().ok_or_else(|| {
            DomainError::SnapshotUnavailable("no inventory snapshot to validate against".to_string())
        })?;
        form.to_input(&snapshot)
    }

    async fn finish(&self) {
        if let Err(e) = self.inventory.refresh(false).await {
            warn!(error = %e, "refresh after mutation failed");
        }
        self.publish(WorkflowState::Idle, None);
    }

    /// Record a failed transition. An expired session abandons the workflow;
    /// anything else keeps the current state with the error attached.
    fn fail(&self, state: &WorkflowState, e: DomainError) -> DomainError {
        if e.is_unauthorized() {
            warn!(from = state.name(), "session expired during workflow, resetting");
            self.publish(WorkflowState::Idle, Some(e.user_message()));
        } else {
            warn!(from = state.name(), error = %e, "workflow action failed");
            self.publish(state.clone(), Some(e.user_message()));
        }
        e
    }

    fn publish(&self, state: WorkflowState, error: Option<String>) {
        let next = WorkflowView { state, error };
        self.view.send_if_modified(|view| {
            if *view == next {
                return false;
            }
            *view = next;
            true
        });
    }
}

fn session_ended() -> DomainError {
    DomainError::Unauthorized("session ended".to_string())
}

fn invalid_transition(state: &WorkflowState, action: &str) -> DomainError {
    DomainError::InvalidTransition {
        state: state.name().to_string(),
        action: action.to_string(),
    }
}
