// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This crate defines the boundary between ledger logic (chaincode) and the ledger host
//! that runs it.
//!
//! The host owns consensus, transaction ordering, persistence and distribution. What it
//! exposes to chaincode is reduced to two traits:
//! * [`WorldState`]: get and put raw records by string key.
//! * [`Chaincode`]: the `init`, `invoke` and `query` entry points the host calls.
//!
//! Two world states are provided: [`MemoryWorldState`] keeps records in memory and can
//! emulate a host serializing accesses per key, while [`FileWorldState`] keeps one file
//! per key in a directory.

#![deny(missing_docs)]

/// The entry points a host calls on a chaincode.
pub mod chaincode;

/// Directory-backed world state.
pub mod file;

/// In-memory world state.
pub mod memory;

/// The world state trait definitions.
pub mod store;

/// Helpers for tests.
#[cfg(with_testing)]
pub mod test_utils;

pub use crate::{
    chaincode::Chaincode,
    file::{FileWorldState, FileWorldStateError},
    memory::{MemoryWorldState, MemoryWorldStateConfig, MemoryWorldStateError},
    store::{KeyGuard, WithError, WorldState, WorldStateError},
};
