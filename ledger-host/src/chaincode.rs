// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The entry points a ledger host calls on a chaincode.

/// Ledger logic installed on a host.
///
/// The host calls [`Chaincode::init`] once when the chaincode is instantiated, then
/// [`Chaincode::invoke`] for every state-changing transaction and [`Chaincode::query`]
/// for read-only requests. Calls are dispatched one at a time per transaction; ordering
/// between transactions is up to the host.
#[trait_variant::make(Send)]
pub trait Chaincode {
    /// The error returned to the host when a call fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sets up the initial world state.
    async fn init(&self) -> Result<(), Self::Error>;

    /// Executes the mutating operation named `function`.
    async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, Self::Error>;

    /// Answers the read-only request named `function`.
    async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, Self::Error>;
}
