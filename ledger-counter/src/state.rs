// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// The names of the counters created at initialization, in key order.
pub const COUNTER_NAMES: [&str; 3] = ["Office Worker", "Home Worker", "Student"];

/// The world state key of the counter at position `index` in [`COUNTER_NAMES`].
pub fn counter_key(index: usize) -> String {
    index.to_string()
}

/// A named tally, stored in the world state as `{"name":...,"counts":...}`.
///
/// Missing fields decode to their zero value and unknown fields are ignored. Field names
/// are case-sensitive, and a field of the wrong type rejects the whole record.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Counter {
    name: String,
    #[serde(rename = "counts")]
    count: u64,
}

impl Counter {
    /// Creates a counter named `name`, starting at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Counter {
            name: name.into(),
            count: 0,
        }
    }

    /// The counter standing in for a record that could not be read: no name, no count.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Adds one to the count. Returns `None`, leaving the count untouched, on overflow.
    pub fn increment(&mut self) -> Option<u64> {
        self.count = self.count.checked_add(1)?;
        Some(self.count)
    }

    /// Encodes the record as compact JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decodes a record written by [`Counter::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
