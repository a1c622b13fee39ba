//! Token store backends
//!
//! The store holds at most one credential. Writes overwrite whatever was
//! there; there is no locking, so concurrent processes race and the last
//! writer wins.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Credential;

/// Durable storage for the single credential of this client
pub trait TokenStore {
    /// Load the stored credential, `None` if nothing has been stored yet
    fn load(&self) -> Result<Option<Credential>>;

    /// Store `credential`, replacing any previous value
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the stored credential
    fn clear(&self) -> Result<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for &T {
    fn load(&self) -> Result<Option<Credential>> {
        (**self).load()
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        (**self).save(credential)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// JSON token file on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let credential = config::load_json_file(&self.path)?;
        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        config::save_json_file(&self.path, credential)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove token file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// In-memory token store
///
/// Counts writes so callers can tell whether a credential was re-persisted.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    credential: Option<Credential>,
    writes: usize,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `credential`
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: Mutex::new(StoreState {
                credential: Some(credential),
                writes: 0,
            }),
        }
    }

    /// Number of successful `save` calls
    pub fn writes(&self) -> usize {
        self.inner.lock().map(|s| s.writes).unwrap_or(0)
    }

    /// Current contents
    pub fn current(&self) -> Option<Credential> {
        self.inner.lock().ok().and_then(|s| s.credential.clone())
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<Credential>> {
        let state = self.inner.lock().map_err(|_| anyhow!("token store lock poisoned"))?;
        Ok(state.credential.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let mut state = self.inner.lock().map_err(|_| anyhow!("token store lock poisoned"))?;
        state.credential = Some(credential.clone());
        state.writes += 1;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.inner.lock().map_err(|_| anyhow!("token store lock poisoned"))?;
        state.credential = None;
        Ok(())
    }
}
