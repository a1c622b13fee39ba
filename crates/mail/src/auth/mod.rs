//! Credential management
//!
//! [`CredentialManager::authenticate`] produces a usable [`Credential`]:
//! - a stored, unexpired credential is returned as-is
//! - an expired credential with a refresh token is refreshed silently
//! - anything else goes through interactive consent
//!
//! Every refresh or consent result is written back to the [`TokenStore`].

mod store;

pub use store::{FileTokenStore, InMemoryTokenStore, TokenStore};

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ClientSecret;
use crate::error::AuthError;
use crate::session::Session;

/// Read-only Gmail access
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// A token is treated as expired this long before its actual expiry
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth token pair plus the client that issued it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// `None` means the issuer gave no lifetime; such a token never expires locally
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    pub scope: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

impl Credential {
    /// Whether the access token is (about to be) past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + TimeDelta::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Usable without a refresh or consent round-trip
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    /// Whether a refresh token is available
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The client configuration this credential was issued to
    pub fn client(&self) -> ClientSecret {
        ClientSecret {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: None,
            token_uri: self.token_uri.clone(),
        }
    }
}

/// The two token-issuing exchanges with the OAuth server
pub trait OAuthProvider {
    /// Exchange the refresh token of `credential` for a new access token.
    ///
    /// Must not require user interaction.
    fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError>;

    /// Run the interactive consent flow for `scope`
    fn consent(&self, secret: &ClientSecret, scope: &str) -> Result<Credential, AuthError>;
}

impl<T: OAuthProvider + ?Sized> OAuthProvider for &T {
    fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        (**self).refresh(credential)
    }

    fn consent(&self, secret: &ClientSecret, scope: &str) -> Result<Credential, AuthError> {
        (**self).consent(secret, scope)
    }
}

/// Loads, refreshes or issues the read-only Gmail credential
pub struct CredentialManager<S, P> {
    store: S,
    provider: P,
    client_secret_file: Option<PathBuf>,
}

impl<S: TokenStore, P: OAuthProvider> CredentialManager<S, P> {
    /// Create a manager for the read-only Gmail scope.
    ///
    /// Without a client secret file, interactive consent is unavailable.
    pub fn new(store: S, provider: P) -> Self {
        Self {
            store,
            provider,
            client_secret_file: None,
        }
    }

    /// Client secret used when consent is required
    pub fn with_client_secret_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_secret_file = Some(path.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a usable credential, refreshing or re-issuing it as needed
    pub fn authenticate(&self) -> Result<Credential, AuthError> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring unreadable token store: {:#}", e);
                None
            }
        };

        let credential = match stored {
            Some(credential) if credential.is_valid() => {
                debug!("Using stored credential");
                return Ok(credential);
            }
            Some(credential) if credential.is_expired() && credential.can_refresh() => {
                info!("Access token expired, refreshing");
                self.provider.refresh(&credential)?
            }
            _ => {
                let secret = self.load_client_secret()?;
                info!("No usable credential, starting interactive consent");
                self.provider.consent(&secret, GMAIL_READONLY_SCOPE)?
            }
        };

        self.store
            .save(&credential)
            .map_err(|e| AuthError::TokenStore(format!("{:#}", e)))?;
        debug!("Persisted credential");
        Ok(credential)
    }

    /// Authenticate and wrap the result in a [`Session`]
    pub fn open_session(&self) -> Result<Session, AuthError> {
        self.authenticate().map(Session::new)
    }

    /// Forget the stored credential
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store
            .clear()
            .map_err(|e| AuthError::TokenStore(format!("{:#}", e)))
    }

    fn load_client_secret(&self) -> Result<ClientSecret, AuthError> {
        let path = self.client_secret_file.as_ref().ok_or_else(|| {
            AuthError::MissingClientSecret("no client secret file configured".to_string())
        })?;
        ClientSecret::load(path).map_err(|e| AuthError::MissingClientSecret(format!("{:#}", e)))
    }
}
