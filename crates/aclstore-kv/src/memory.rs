//! In-process key-value backend.
//!
//! Every entry carries a version stamp drawn from a store-wide counter. An
//! update reads the entry and its version, runs the caller's closure with no
//! lock held, then commits only if the version is still the one it read.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::traits::{Committed, KeyLister, KvStore, Mutation, UpdateFn};
use crate::{Error, Result};

#[derive(Clone, Debug)]
struct Entry {
    version: u64,
    value: Vec<u8>,
}

/// Versioned in-memory [`KvStore`].
///
/// Supports key enumeration unless built with
/// [`without_key_listing`](Self::without_key_listing).
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    next_version: AtomicU64,
    listable: bool,
}

impl MemoryStore {
    /// Create an empty store that supports key enumeration.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_version: AtomicU64::new(0),
            listable: true,
        }
    }

    /// Disable the [`KeyLister`] capability.
    pub fn without_key_listing(mut self) -> Self {
        self.listable = false;
        self
    }

    /// Store `value` under `key` unconditionally.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Result<()> {
        let version = self.bump();
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(
            key.into(),
            Entry {
                version,
                value: value.into(),
            },
        );
        Ok(())
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn bump(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn snapshot(&self, key: &str) -> Result<Option<Entry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Commit `value` if the entry's version still equals `seen`.
    fn try_commit(&self, key: &str, seen: Option<u64>, value: Vec<u8>) -> Result<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        if entries.get(key).map(|e| e.version) != seen {
            return Ok(false);
        }
        let version = self.bump();
        entries.insert(key.to_string(), Entry { version, value });
        Ok(true)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot(key)?.map(|e| e.value))
    }

    async fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Committed> {
        let mut conflicts = 0u32;
        loop {
            let seen = self.snapshot(key)?;
            let value = match f(seen.as_ref().map(|e| e.value.as_slice())) {
                Mutation::Keep => return Ok(Committed::Unchanged),
                Mutation::Put(value) => value,
            };
            if self.try_commit(key, seen.map(|e| e.version), value)? {
                return Ok(Committed::Written);
            }
            conflicts += 1;
            log::debug!("memory store: conflicting write on '{key}', retry {conflicts}");
            tokio::task::yield_now().await;
        }
    }

    fn key_lister(&self) -> Option<&dyn KeyLister> {
        if self.listable { Some(self) } else { None }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl KeyLister for MemoryStore {
    async fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::LockPoisoned(e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
