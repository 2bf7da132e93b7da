use common::auth::SessionGuard;
use common::domain::{DomainError, DomainResult, InventoryApi};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Operator credentials for sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Signs the operator in and out of the inventory service
pub struct SessionService {
    api: Arc<dyn InventoryApi>,
    guard: SessionGuard,
}

impl SessionService {
    pub fn new(api: Arc<dyn InventoryApi>, guard: SessionGuard) -> Self {
        Self { api, guard }
    }

    /// Exchange credentials for a bearer token and start a session.
    /// Returns the scope token of the new session.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> DomainResult<CancellationToken> {
        debug!("attempting sign-in");

        let email = input.email.trim();
        if !is_plausible_email(email) || input.password.is_empty() {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.api.authenticate(email, &input.password).await?;
        let scope = self.guard.establish(email.to_string(), token).await;

        info!("operator signed in");
        Ok(scope)
    }

    /// End the current session and stop work bound to its scope
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        self.guard.teardown("operator signed out").await;
    }

    pub async fn identity(&self) -> Option<String> {
        self.guard.identity().await
    }

    pub async fn is_signed_in(&self) -> bool {
        self.guard.is_authenticated().await
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}
