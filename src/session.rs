//! Holder of the admin credential token.
//!
//! The token is the only client state that outlives a run. It is read from
//! storage once when the store is opened, and every later transition writes
//! through. Readers outside the dispatch layer only get to ask whether a token
//! is held.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub trait TokenStorage: Send + Sync {
    fn load(&self) -> std::io::Result<Option<String>>;
    fn store(&self, token: &str) -> std::io::Result<()>;
    fn remove(&self) -> std::io::Result<()>;
}

/// Keeps the token in a single file.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(data.split_whitespace().next().map(|s| s.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn store(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, token)
    }

    fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// In-memory storage. Clones share the same slot, so a second store opened on
/// a clone sees what the first one persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        MemoryStorage {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    pub fn persisted(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        Ok(self.persisted())
    }

    fn store(&self, token: &str) -> std::io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> std::io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

struct Inner {
    token: RwLock<Option<String>>,
    storage: Box<dyn TokenStorage>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("held", &self.is_held())
            .finish()
    }
}

impl SessionStore {
    /// Opens the store, picking up whatever token was persisted by an earlier run.
    pub fn open(storage: impl TokenStorage + 'static) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!("Failed to read persisted session token: {}", err);
                None
            },
        };
        tracing::debug!(held = token.is_some(), "Opened session store");

        SessionStore {
            inner: Arc::new(Inner {
                token: RwLock::new(token),
                storage: Box::new(storage),
            }),
        }
    }

    pub fn ephemeral() -> Self {
        Self::open(MemoryStorage::new())
    }

    pub fn is_held(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current token. Only the dispatch layer reads it, at the moment a request is sent.
    pub(crate) fn token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, token: String) {
        if let Err(err) = self.inner.storage.store(&token) {
            tracing::warn!("Failed to persist session token: {}", err);
        }
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
        tracing::info!("Session token stored");
    }

    pub(crate) fn clear(&self) {
        let previous = self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(err) = self.inner.storage.remove() {
            tracing::warn!("Failed to remove persisted session token: {}", err);
        }
        if previous.is_some() {
            tracing::info!("Session token cleared");
        }
    }
}
