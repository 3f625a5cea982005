// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This provides the trait definitions for the world state exposed by a ledger host.

use std::{fmt::Debug, future::Future};

use tokio::sync::OwnedMutexGuard;

/// The error type for the world state backends.
pub trait WorldStateError: std::error::Error + Debug + Send + Sync + 'static {
    /// The name of the backend.
    const BACKEND: &'static str;
}

/// Define an associated [`WorldStateError`].
pub trait WithError {
    /// The error type.
    type Error: WorldStateError;
}

/// A guard granting exclusive access to one key until it is dropped.
pub type KeyGuard = OwnedMutexGuard<()>;

/// Key-value access to the host ledger's current world state.
///
/// Reads and writes are independent: the host offers no transactions, no batching and no
/// compare-and-swap. A read followed by a write of the same key is therefore not atomic
/// unless the caller holds the guard returned by [`WorldState::key_lock`].
#[trait_variant::make(Send)]
pub trait WorldState: WithError + Send + Sync {
    /// Retrieves the record stored at `key`, or `None` if the key is absent.
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Stores `value` at `key`, replacing any previous record.
    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), Self::Error>;

    /// Acquires the host-provided serialization guard for `key`, if the host has one.
    ///
    /// Hosts that already serialize transactions per key, or that cannot serialize at
    /// all, return `None`.
    fn key_lock(&self, _key: &str) -> impl Future<Output = Option<KeyGuard>> {
        async { None }
    }
}
