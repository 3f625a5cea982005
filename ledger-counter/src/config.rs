// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::CounterError;

/// What to do when a world state access or a record codec fails.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Return the failure to the host.
    #[default]
    Propagate,
    /// Log the failure and carry on: an unreadable record counts as a zero-valued counter
    /// and a failed write is dropped. Unknown operations are still rejected.
    Absorb,
}

/// The configuration of a [`crate::CounterService`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CounterConfig {
    /// How state and codec failures are handled.
    pub error_policy: ErrorPolicy,
    /// Hold the host's per-key guard, when it offers one, for the whole read-modify-write
    /// of an increment. Without it, concurrent increments of one key may lose updates.
    pub serialize_increments: bool,
}

impl CounterConfig {
    /// The configuration absorbing every state and codec failure.
    pub fn absorbing() -> Self {
        CounterConfig {
            error_policy: ErrorPolicy::Absorb,
            ..Self::default()
        }
    }

    /// Reads a configuration from JSON, e.g. `{"error_policy":"absorb"}`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CounterError> {
        serde_json::from_slice(bytes).map_err(CounterError::InvalidConfig)
    }
}
