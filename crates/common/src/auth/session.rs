use crate::domain::AccessToken;
use tokio_util::sync::CancellationToken;

/// Signed-in state of the console: bearer credential plus the identity it was
/// issued to.
///
/// Every session carries a scope token. Work started on behalf of the session
/// (background polling) watches that token and stops when the session ends.
#[derive(Debug)]
pub struct Session {
    credential: Option<AccessToken>,
    identity: Option<String>,
    scope: CancellationToken,
    generation: u64,
}

impl Session {
    /// A session with no credential; its scope is already cancelled
    pub fn signed_out() -> Self {
        let scope = CancellationToken::new();
        scope.cancel();
        Self {
            credential: None,
            identity: None,
            scope,
            generation: 0,
        }
    }

    /// Start a new session, replacing whatever was held before
    pub fn establish(&mut self, identity: String, credential: AccessToken) -> CancellationToken {
        self.scope.cancel();
        self.credential = Some(credential);
        self.identity = Some(identity);
        self.scope = CancellationToken::new();
        self.generation += 1;
        self.scope.clone()
    }

    /// Drop the credential and identity and cancel the session scope.
    /// Returns false if there was nothing to tear down.
    pub fn teardown(&mut self) -> bool {
        let had_credential = self.credential.take().is_some();
        self.identity = None;
        self.scope.cancel();
        had_credential
    }

    pub fn credential(&self) -> Option<&AccessToken> {
        self.credential.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn scope(&self) -> CancellationToken {
        self.scope.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Counter bumped by every `establish`; identifies which sign-in a
    /// request's credential came from
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::signed_out()
    }
}
