// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Implements [`crate::store::WorldState`] in memory.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::store::{KeyGuard, WithError, WorldState, WorldStateError};

#[cfg(test)]
#[path = "unit_tests/memory_tests.rs"]
mod memory_tests;

/// The initial configuration of an in-memory world state.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MemoryWorldStateConfig {
    /// Whether [`WorldState::key_lock`] hands out per-key guards, emulating a host that
    /// serializes the transactions touching the same key.
    #[serde(default)]
    pub serialize_keys: bool,
}

/// The records of a world state, ordered by key.
type MemoryWorldStateMap = BTreeMap<String, Vec<u8>>;

/// The per-key guards handed out when key serialization is enabled. Entries of keys that
/// are neither held nor awaited are dropped on the next acquisition.
type KeyLocks = DashMap<String, Arc<Mutex<()>>>;

/// A world state kept in memory. Clones share the same records.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorldState {
    /// The map used for storing the records.
    map: Arc<RwLock<MemoryWorldStateMap>>,
    /// The per-key locks, if the host serializes keys.
    key_locks: Option<Arc<KeyLocks>>,
}

/// The error type for [`MemoryWorldState`].
#[derive(Error, Debug)]
pub enum MemoryWorldStateError {
    /// A writer panicked while holding the records.
    #[error("The in-memory world state lock is poisoned")]
    LockPoisoned,
}

impl WorldStateError for MemoryWorldStateError {
    const BACKEND: &'static str = "memory";
}

impl WithError for MemoryWorldState {
    type Error = MemoryWorldStateError;
}

impl MemoryWorldState {
    /// Creates an empty world state using the given `config`.
    pub fn new(config: &MemoryWorldStateConfig) -> Self {
        let key_locks = config
            .serialize_keys
            .then(|| Arc::new(KeyLocks::default()));
        MemoryWorldState {
            map: Arc::default(),
            key_locks,
        }
    }

    /// Creates an empty world state whose host serializes accesses per key.
    pub fn with_key_serialization() -> Self {
        Self::new(&MemoryWorldStateConfig {
            serialize_keys: true,
        })
    }

    /// Whether this world state hands out per-key guards.
    pub fn serializes_keys(&self) -> bool {
        self.key_locks.is_some()
    }

    /// Creates a distinct copy of the data. The copy shares no records or locks with `self`.
    pub fn copy(&self) -> Result<Self, MemoryWorldStateError> {
        let map = self.snapshot()?;
        Ok(MemoryWorldState {
            map: Arc::new(RwLock::new(map)),
            key_locks: self
                .key_locks
                .as_ref()
                .map(|_| Arc::new(KeyLocks::default())),
        })
    }

    /// Returns a copy of every record, ordered by key.
    pub fn snapshot(&self) -> Result<BTreeMap<String, Vec<u8>>, MemoryWorldStateError> {
        let map = self
            .map
            .read()
            .map_err(|_| MemoryWorldStateError::LockPoisoned)?;
        Ok(map.clone())
    }

    /// Returns the keys currently present, in order.
    pub fn keys(&self) -> Result<Vec<String>, MemoryWorldStateError> {
        let map = self
            .map
            .read()
            .map_err(|_| MemoryWorldStateError::LockPoisoned)?;
        Ok(map.keys().cloned().collect())
    }

    /// The number of records.
    pub fn len(&self) -> Result<usize, MemoryWorldStateError> {
        let map = self
            .map
            .read()
            .map_err(|_| MemoryWorldStateError::LockPoisoned)?;
        Ok(map.len())
    }

    /// Whether the world state holds no record at all.
    pub fn is_empty(&self) -> Result<bool, MemoryWorldStateError> {
        Ok(self.len()? == 0)
    }
}

impl WorldState for MemoryWorldState {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, MemoryWorldStateError> {
        let map = self
            .map
            .read()
            .map_err(|_| MemoryWorldStateError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), MemoryWorldStateError> {
        let mut map = self
            .map
            .write()
            .map_err(|_| MemoryWorldStateError::LockPoisoned)?;
        map.insert(key.to_owned(), value);
        Ok(())
    }

    async fn key_lock(&self, key: &str) -> Option<KeyGuard> {
        let key_locks = self.key_locks.as_ref()?;
        // Only the table holds the lock of a key nobody holds or awaits.
        key_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        let lock = key_locks.entry(key.to_owned()).or_default().clone();
        Some(lock.lock_owned().await)
    }
}
