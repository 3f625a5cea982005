// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! ABI of the Counter Chaincode

The chaincode keeps three named counters in the world state, addressed by their ordinal
keys `"0"`, `"1"` and `"2"`. Hosts reach it through [`ledger_host::Chaincode`]:
`invoke("countUp", [key])` increments one counter and `query("refresh", [])` returns all
of them.
*/

mod config;
mod error;
mod service;
mod state;

pub use crate::{
    config::{CounterConfig, ErrorPolicy},
    error::CounterError,
    service::CounterService,
    state::{counter_key, Counter, COUNTER_NAMES},
};

/// The name of the mutating function incrementing a counter.
pub const COUNT_UP: &str = "countUp";

/// The name of the read-only function returning every counter.
pub const REFRESH: &str = "refresh";

/// Operations accepted by [`ledger_host::Chaincode::invoke`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CounterOperation {
    /// Increments the counter stored at `key` by one.
    CountUp { key: String },
}

/// Requests accepted by [`ledger_host::Chaincode::query`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CounterQuery {
    /// Returns the records of every counter, in key order.
    Refresh,
}

impl CounterOperation {
    /// Parses the function name and arguments received from the host.
    pub fn parse(function: &str, args: &[String]) -> Result<Self, CounterError> {
        match function {
            COUNT_UP => {
                let key = args.first().ok_or_else(|| CounterError::MissingArgument {
                    operation: COUNT_UP.to_owned(),
                    index: 0,
                })?;
                Ok(CounterOperation::CountUp { key: key.clone() })
            }
            other => Err(CounterError::UnknownOperation(other.to_owned())),
        }
    }
}

impl CounterQuery {
    /// Parses the function name received from the host. Arguments are ignored.
    pub fn parse(function: &str, _args: &[String]) -> Result<Self, CounterError> {
        match function {
            REFRESH => Ok(CounterQuery::Refresh),
            other => Err(CounterError::UnknownOperation(other.to_owned())),
        }
    }
}
