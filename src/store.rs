/*
[INPUT]:  AuthSession records and a key-value storage backend
[OUTPUT]: Persisted session slot with tolerant reads
[POS]:    Persistence layer - single-slot session cache over an opaque store
[UPDATE]: When the record format or storage backends change
*/

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Default storage slot for the cached session.
pub const DEFAULT_STORAGE_KEY: &str = "wallet_auth_session";

/// The persisted proof-of-signature record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Base58-encoded detached signature
    pub signature: String,
    /// Base58-encoded public key of the signer
    pub pubkey: String,
    /// Seconds since epoch at signing time
    #[serde(rename = "signedAt")]
    pub signed_at: i64,
}

/// Opaque text key-value store, the persistence boundary of this crate.
///
/// Models a browser-style local storage: synchronous reads and writes of
/// UTF-8 text by key. Implement this to plug in a real backend.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Write `value` under `key`, overwriting any prior value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Remove the value stored under `key`.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

/// File-backed store: one file per key under a directory.
///
/// Writes go through a temp file and rename so a crash mid-write never
/// leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Single-slot session cache over a [`KvStore`].
///
/// Exactly one logical record exists per storage key. The slot is not keyed
/// by public key: switching identities reuses it until the next save
/// overwrites the previous identity's record.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KvStore>,
    key: String,
}

impl SessionStore {
    /// Create a session store over `store` using [`DEFAULT_STORAGE_KEY`].
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    /// Create a session store with an explicit storage key.
    pub fn with_key(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Persist `session`, unconditionally overwriting any prior record.
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let text = serde_json::to_string(session)?;
        self.store.set(&self.key, &text)
    }

    /// Load the cached session.
    ///
    /// Returns `None` for an empty slot and for malformed data alike; a
    /// corrupt record is logged and treated identically to "no session".
    pub fn load(&self) -> Option<AuthSession> {
        let text = self.store.get(&self.key)?;
        match serde_json::from_str(&text) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(key = %self.key, error = %e, "ignoring corrupt session record");
                None
            }
        }
    }

    /// Remove the cached session, if any.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}
