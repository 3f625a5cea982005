// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! World state wrappers used to exercise chaincode under adverse host behavior.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use thiserror::Error;

use crate::{
    memory::{MemoryWorldState, MemoryWorldStateError},
    store::{KeyGuard, WithError, WorldState, WorldStateError},
};

/// A world state that yields to the scheduler before every write.
///
/// When several read-modify-write sequences are polled together (e.g. with
/// `futures::future::join_all`), every sequence performs its read before any of them
/// writes, unless they hold the guard from [`WorldState::key_lock`].
#[derive(Clone, Default)]
pub struct InterleavingWorldState<S> {
    inner: S,
}

impl<S> InterleavingWorldState<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        InterleavingWorldState { inner }
    }

    /// The wrapped world state.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: WithError> WithError for InterleavingWorldState<S> {
    type Error = S::Error;
}

impl<S: WorldState> WorldState for InterleavingWorldState<S> {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, S::Error> {
        self.inner.get_state(key).await
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), S::Error> {
        tokio::task::yield_now().await;
        self.inner.put_state(key, value).await
    }

    async fn key_lock(&self, key: &str) -> Option<KeyGuard> {
        self.inner.key_lock(key).await
    }
}

/// An in-memory world state whose reads or writes can be made to fail on demand.
#[derive(Clone, Default)]
pub struct FaultyWorldState {
    inner: MemoryWorldState,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

/// The error type for [`FaultyWorldState`].
#[derive(Error, Debug)]
pub enum FaultyWorldStateError {
    /// A read was configured to fail.
    #[error("Injected read failure for key {0:?}")]
    Read(String),

    /// A write was configured to fail.
    #[error("Injected write failure for key {0:?}")]
    Write(String),

    /// The underlying in-memory state failed.
    #[error(transparent)]
    Memory(#[from] MemoryWorldStateError),
}

impl WorldStateError for FaultyWorldStateError {
    const BACKEND: &'static str = "faulty";
}

impl WithError for FaultyWorldState {
    type Error = FaultyWorldStateError;
}

impl FaultyWorldState {
    /// Wraps `inner`, initially without any failure.
    pub fn new(inner: MemoryWorldState) -> Self {
        FaultyWorldState {
            inner,
            ..Default::default()
        }
    }

    /// The wrapped world state, which stays accessible while failures are injected.
    pub fn inner(&self) -> &MemoryWorldState {
        &self.inner
    }

    /// Makes every subsequent read fail, or succeed again.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail, or succeed again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl WorldState for FaultyWorldState {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, FaultyWorldStateError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(FaultyWorldStateError::Read(key.to_owned()));
        }
        Ok(self.inner.get_state(key).await?)
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), FaultyWorldStateError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FaultyWorldStateError::Write(key.to_owned()));
        }
        Ok(self.inner.put_state(key, value).await?)
    }

    async fn key_lock(&self, key: &str) -> Option<KeyGuard> {
        self.inner.key_lock(key).await
    }
}
