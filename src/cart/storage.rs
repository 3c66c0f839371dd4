//! # Persistent Key-Value Bridge
//!
//! Keeps the cart across restarts of the same client. The cart is stored as a
//! versioned JSON envelope under one fixed key:
//!
//! ```text
//! {"version":1,"items":[{"id":"item_1","name":"Soup","price":"4.50","quantity":2}]}
//! ```
//!
//! Storage is best-effort. [`CartPersistence::save`] and
//! [`CartPersistence::remove`] log failures with `warn!` and return; reads that
//! find nothing, garbage, or an unknown version yield an empty cart.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::StorageError;
use crate::model::LineItem;

/// Default key the cart is stored under.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Current version of the persisted envelope.
pub const CART_SCHEMA_VERSION: u32 = 1;

/// A string key-value store the cart can persist into.
pub trait CartStorage: Send + Sync + Debug {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a key that doesn't exist succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// BACKENDS
// =============================================================================

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a half-written cart behind.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `write` and `remove` fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    /// Stores a raw value, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries().remove(key);
        Ok(())
    }
}

// =============================================================================
// THE BRIDGE
// =============================================================================

#[derive(Serialize)]
struct PersistedCartRef<'a> {
    version: u32,
    items: &'a [LineItem],
}

#[derive(Deserialize)]
struct PersistedCart {
    version: u32,
    items: Vec<LineItem>,
}

/// Loads and saves the cart's line items under one key of a [`CartStorage`].
#[derive(Debug, Clone)]
pub struct CartPersistence {
    storage: Arc<dyn CartStorage>,
    key: String,
}

impl CartPersistence {
    pub fn new(storage: Arc<dyn CartStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the persisted items, or an empty list if nothing usable is stored.
    pub fn load(&self) -> Vec<LineItem> {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No saved cart");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read saved cart, starting empty");
                return Vec::new();
            }
        };

        let persisted: PersistedCart = match serde_json::from_str(&raw) {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Saved cart is corrupt, starting empty");
                return Vec::new();
            }
        };
        if persisted.version != CART_SCHEMA_VERSION {
            warn!(key = %self.key, version = persisted.version, "Unknown cart version, starting empty");
            return Vec::new();
        }

        let items = sanitize(persisted.items);
        debug!(key = %self.key, count = items.len(), "Loaded saved cart");
        items
    }

    /// Writes the items. Failures are logged and otherwise ignored.
    pub fn save(&self, items: &[LineItem]) {
        if let Err(e) = self.try_save(items) {
            warn!(key = %self.key, error = %e, "Failed to persist cart");
        }
    }

    fn try_save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        let envelope = PersistedCartRef {
            version: CART_SCHEMA_VERSION,
            items,
        };
        let json = serde_json::to_string(&envelope)?;
        self.storage.write(&self.key, &json)
    }

    /// Deletes the persisted key. Failures are logged and otherwise ignored.
    pub fn remove(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to remove persisted cart");
        }
    }
}

/// Drops rows that break the cart invariants: zero quantities and repeated ids.
fn sanitize(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut clean: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 || item.unit_price.is_sign_negative() {
            continue;
        }
        if clean.iter().any(|existing| existing.id == item.id) {
            continue;
        }
        clean.push(item);
    }
    clean
}
