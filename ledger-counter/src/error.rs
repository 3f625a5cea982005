// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use ledger_host::WorldStateError;
use thiserror::Error;

/// An error that can occur during the chaincode execution.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The host called a function this chaincode does not export.
    #[error("Received unknown function {0:?}")]
    UnknownOperation(String),

    /// A required argument was not supplied.
    #[error("Function {operation:?} requires an argument at position {index}")]
    MissingArgument { operation: String, index: usize },

    /// No record is stored at the key.
    #[error("No counter is stored at key {key:?}")]
    MissingRecord { key: String },

    /// The record stored at the key is not a valid counter.
    #[error("Failed to decode the counter stored at key {key:?}")]
    Decode {
        key: String,
        #[source]
        error: serde_json::Error,
    },

    /// A counter could not be encoded.
    #[error("Failed to encode the counter for key {key:?}")]
    Encode {
        key: String,
        #[source]
        error: serde_json::Error,
    },

    /// A query response could not be encoded.
    #[error("Failed to encode the query response")]
    EncodeResponse(#[source] serde_json::Error),

    /// The world state failed to read the key.
    #[error("The {backend} world state failed to read key {key:?}")]
    StateRead {
        key: String,
        backend: &'static str,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The world state failed to write the key.
    #[error("The {backend} world state failed to write key {key:?}")]
    StateWrite {
        key: String,
        backend: &'static str,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The counter already holds the largest representable count.
    #[error("The counter stored at key {key:?} cannot be incremented any further")]
    CountOverflow { key: String },

    /// The configuration could not be parsed.
    #[error("Invalid counter configuration")]
    InvalidConfig(#[source] serde_json::Error),
}

impl CounterError {
    pub(crate) fn state_read<E: WorldStateError>(key: &str, error: E) -> Self {
        CounterError::StateRead {
            key: key.to_owned(),
            backend: E::BACKEND,
            error: Box::new(error),
        }
    }

    pub(crate) fn state_write<E: WorldStateError>(key: &str, error: E) -> Self {
        CounterError::StateWrite {
            key: key.to_owned(),
            backend: E::BACKEND,
            error: Box::new(error),
        }
    }

    /// Whether the failure is one the [`crate::ErrorPolicy::Absorb`] policy swallows.
    pub fn is_absorbable(&self) -> bool {
        matches!(
            self,
            CounterError::MissingRecord { .. }
                | CounterError::Decode { .. }
                | CounterError::Encode { .. }
                | CounterError::StateRead { .. }
                | CounterError::StateWrite { .. }
        )
    }
}
