//! Configuration loading for the mail client
//!
//! OAuth client credentials are loaded from (in order of priority):
//! 1. JSON file (Google Cloud Console format)
//! 2. Runtime environment variables (fallback)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Client secret filename in the sift config directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Token store filename in the sift config directory
pub const TOKEN_FILE: &str = "token.json";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client configuration used for consent and refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
}

/// Google Cloud Console credential file format (installed app)
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecret {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: None,
            token_uri: None,
        }
    }

    /// Load the client secret from `path` if it exists, else from the environment
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }

        Self::from_env().with_context(|| {
            format!(
                "No client secret at {} and no environment fallback",
                path.display()
            )
        })
    }

    /// Load the client secret from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    /// Parse the client secret from a JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Support both "installed" (desktop) and "web" credential types
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
            auth_uri: installed.auth_uri,
            token_uri: installed.token_uri,
        })
    }

    /// Load the client secret from SIFT_CLIENT_ID / SIFT_CLIENT_SECRET
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("SIFT_CLIENT_ID")
            .context("SIFT_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("SIFT_CLIENT_SECRET")
            .context("SIFT_CLIENT_SECRET environment variable not set")?;

        Ok(Self::new(client_id, client_secret))
    }

    pub fn auth_uri(&self) -> &str {
        self.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URI)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

/// Locations of the token store and the client secret file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailPaths {
    pub token_file: PathBuf,
    pub credentials_file: PathBuf,
}

impl MailPaths {
    /// Default locations inside ~/.config/sift/
    pub fn default_paths() -> Result<Self> {
        let token_file =
            config::config_path(TOKEN_FILE).context("Could not determine config directory")?;
        let credentials_file = config::config_path(CREDENTIALS_FILE)
            .context("Could not determine config directory")?;
        Ok(Self {
            token_file,
            credentials_file,
        })
    }

    /// Defaults with optional per-file overrides
    pub fn resolve(token_file: Option<PathBuf>, credentials_file: Option<PathBuf>) -> Result<Self> {
        if let (Some(token_file), Some(credentials_file)) = (&token_file, &credentials_file) {
            return Ok(Self {
                token_file: token_file.clone(),
                credentials_file: credentials_file.clone(),
            });
        }

        let defaults = Self::default_paths()?;
        Ok(Self {
            token_file: token_file.unwrap_or(defaults.token_file),
            credentials_file: credentials_file.unwrap_or(defaults.credentials_file),
        })
    }
}
