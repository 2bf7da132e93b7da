use super::Session;
use crate::domain::AccessToken;
use reqwest::{RequestBuilder, StatusCode};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Authorization outcome of a response from the inventory service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Ok,
    /// 401: credential missing or expired, the session is over
    Unauthorized,
    /// 403: credential valid but the identity lacks privilege for the action
    Forbidden,
    Other(u16),
}

/// Session a request was authorized under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
}

/// Attaches the session's bearer credential to outgoing requests and tears the
/// session down when the service rejects it.
///
/// Cloning the guard shares the same underlying session.
#[derive(Clone, Default)]
pub struct SessionGuard {
    session: Arc<RwLock<Session>>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh credential and return the new session's scope
    pub async fn establish(&self, identity: String, credential: AccessToken) -> CancellationToken {
        let mut session = self.session.write().await;
        info!(identity = %identity, "session established");
        session.establish(identity, credential)
    }

    /// End the session: clear credential and identity and cancel the scope so
    /// background work started under it stops
    pub async fn teardown(&self, reason: &str) {
        let mut session = self.session.write().await;
        if session.teardown() {
            warn!(reason = %reason, "session torn down");
        } else {
            debug!(reason = %reason, "teardown requested without an active session");
        }
    }

    /// Attach the bearer credential, if any. Requests without a credential are
    /// sent as-is and the service will reject them.
    ///
    /// The returned ticket names the session the credential belongs to and
    /// must be handed back to [`SessionGuard::inspect`] with the response.
    pub async fn authorize(&self, request: RequestBuilder) -> (RequestBuilder, SessionTicket) {
        let session = self.session.read().await;
        let ticket = SessionTicket {
            generation: session.generation(),
        };
        let request = match session.credential() {
            Some(credential) => request.bearer_auth(&credential.access_token),
            None => request,
        };
        (request, ticket)
    }

    /// Classify a response status
    pub fn classify(status: StatusCode) -> ResponseClass {
        match status {
            s if s.is_success() => ResponseClass::Ok,
            StatusCode::UNAUTHORIZED => ResponseClass::Unauthorized,
            StatusCode::FORBIDDEN => ResponseClass::Forbidden,
            s => ResponseClass::Other(s.as_u16()),
        }
    }

    /// Classify a response status and apply its side effect: a 401 ends the
    /// session the request was authorized under. A 403 leaves the session in
    /// place, as does a 401 carrying a credential from an earlier sign-in.
    pub async fn inspect(&self, status: StatusCode, ticket: SessionTicket) -> ResponseClass {
        let class = Self::classify(status);
        if class == ResponseClass::Unauthorized {
            let mut session = self.session.write().await;
            if session.generation() != ticket.generation {
                debug!(
                    issued = ticket.generation,
                    current = session.generation(),
                    "ignoring 401 for a superseded session"
                );
            } else if session.teardown() {
                warn!(reason = "credential rejected by inventory service", "session torn down");
            }
        }
        class
    }

    pub async fn identity(&self) -> Option<String> {
        self.session.read().await.identity().map(str::to_string)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Scope token of the current session (already cancelled when signed out)
    pub async fn scope(&self) -> CancellationToken {
        self.session.read().await.scope()
    }
}
