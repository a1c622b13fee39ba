//! Authenticated session handle

use crate::auth::Credential;

/// Immutable handle bound to one credential for the life of the process.
///
/// Every remote call takes a `&Session`; nothing mutates it after creation.
#[derive(Clone)]
pub struct Session {
    credential: Credential,
}

impl Session {
    /// The user id Gmail resolves to the authenticated account
    pub const ME: &'static str = "me";

    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn access_token(&self) -> &str {
        &self.credential.access_token
    }

    pub fn user_id(&self) -> &str {
        Self::ME
    }

    pub fn scope(&self) -> &str {
        &self.credential.scope
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

// Keeps tokens out of logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id())
            .field("scope", &self.scope())
            .field("expiry", &self.credential.expiry)
            .finish_non_exhaustive()
    }
}
