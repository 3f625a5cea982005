// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use ledger_host::{Chaincode, WorldState};
use tracing::instrument;

use crate::{
    counter_key, Counter, CounterConfig, CounterError, CounterOperation, CounterQuery,
    ErrorPolicy, COUNTER_NAMES,
};

#[cfg(test)]
#[path = "unit_tests/service_tests.rs"]
mod service_tests;

/// The counter chaincode, running against the world state `S`.
///
/// An increment reads the record, adds one and writes it back. The read and the write are
/// two separate world state accesses, so two increments of the same key running
/// concurrently may both read the same count and one of the updates is then lost. The host
/// is expected to serialize transactions touching the same key; if it cannot, and the
/// world state offers a per-key guard, [`CounterConfig::serialize_increments`] holds that
/// guard for the duration of each increment.
#[derive(Clone, Debug)]
pub struct CounterService<S> {
    state: S,
    config: CounterConfig,
}

impl<S> CounterService<S> {
    /// Creates the chaincode over `state`.
    pub fn new(state: S, config: CounterConfig) -> Self {
        CounterService { state, config }
    }

    /// The world state the chaincode writes to.
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    fn absorbs(&self, error: &CounterError) -> bool {
        self.config.error_policy == ErrorPolicy::Absorb && error.is_absorbable()
    }

    /// Swallows `result`'s error when the policy absorbs it.
    fn absorb(&self, result: Result<(), CounterError>) -> Result<(), CounterError> {
        match result {
            Err(error) if self.absorbs(&error) => {
                tracing::warn!(?error, "Ignoring counter state failure");
                Ok(())
            }
            result => result,
        }
    }
}

impl<S: WorldState> CounterService<S> {
    /// Writes the counters of [`COUNTER_NAMES`] at their ordinal keys, all starting at zero.
    ///
    /// Existing records at those keys are overwritten.
    #[instrument(level = "debug", skip(self))]
    pub async fn initialize(&self) -> Result<(), CounterError> {
        for (index, name) in COUNTER_NAMES.into_iter().enumerate() {
            let key = counter_key(index);
            let result = self.write_counter(&key, &Counter::new(name)).await;
            self.absorb(result)?;
        }
        tracing::info!(counters = COUNTER_NAMES.len(), "Initialized counters");
        Ok(())
    }

    /// Increments the counter stored at `key` by one.
    ///
    /// The key is not checked against the ones written by [`CounterService::initialize`].
    /// Under [`ErrorPolicy::Absorb`], a key holding no valid record is treated as a
    /// counter with no name and a count of zero, so it ends up with a count of one.
    #[instrument(level = "debug", skip(self))]
    pub async fn increment(&self, key: &str) -> Result<(), CounterError> {
        let _guard = if self.config.serialize_increments {
            let guard = self.state.key_lock(key).await;
            if guard.is_none() {
                tracing::debug!("World state offers no per-key guard, incrementing unserialized");
            }
            guard
        } else {
            None
        };

        let mut counter = self.read_counter_or_zero(key).await?;
        let count = counter
            .increment()
            .ok_or_else(|| CounterError::CountOverflow {
                key: key.to_owned(),
            })?;
        tracing::debug!(name = counter.name(), count, "Counted up");

        let result = self.write_counter(key, &counter).await;
        self.absorb(result)
    }

    /// Reads the counters at the ordinal keys of [`COUNTER_NAMES`], in key order.
    ///
    /// Under [`ErrorPolicy::Absorb`], an unreadable record is reported as a counter with
    /// no name and a count of zero.
    #[instrument(level = "debug", skip(self))]
    pub async fn counters(&self) -> Result<Vec<Counter>, CounterError> {
        let mut counters = Vec::with_capacity(COUNTER_NAMES.len());
        for index in 0..COUNTER_NAMES.len() {
            counters.push(self.read_counter_or_zero(&counter_key(index)).await?);
        }
        Ok(counters)
    }

    async fn read_counter(&self, key: &str) -> Result<Counter, CounterError> {
        let bytes = self
            .state
            .get_state(key)
            .await
            .map_err(|error| CounterError::state_read(key, error))?
            .ok_or_else(|| CounterError::MissingRecord {
                key: key.to_owned(),
            })?;
        Counter::from_bytes(&bytes).map_err(|error| CounterError::Decode {
            key: key.to_owned(),
            error,
        })
    }

    async fn read_counter_or_zero(&self, key: &str) -> Result<Counter, CounterError> {
        match self.read_counter(key).await {
            Err(error) if self.absorbs(&error) => {
                tracing::warn!(?error, "Using a zero-valued counter");
                Ok(Counter::zero())
            }
            result => result,
        }
    }

    async fn write_counter(&self, key: &str, counter: &Counter) -> Result<(), CounterError> {
        let bytes = counter.to_bytes().map_err(|error| CounterError::Encode {
            key: key.to_owned(),
            error,
        })?;
        self.state
            .put_state(key, bytes)
            .await
            .map_err(|error| CounterError::state_write(key, error))?;
        tracing::debug!(key, count = counter.count(), "Stored counter");
        Ok(())
    }
}

impl<S: WorldState> Chaincode for CounterService<S> {
    type Error = CounterError;

    async fn init(&self) -> Result<(), CounterError> {
        self.initialize().await
    }

    async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, CounterError> {
        let operation = CounterOperation::parse(function, args).map_err(|error| {
            tracing::warn!(function, %error, "Rejected invocation");
            error
        })?;
        match operation {
            CounterOperation::CountUp { key } => self.increment(&key).await?,
        }
        Ok(Vec::new())
    }

    async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, CounterError> {
        let query = CounterQuery::parse(function, args).map_err(|error| {
            tracing::warn!(function, %error, "Rejected query");
            error
        })?;
        match query {
            CounterQuery::Refresh => {
                let counters = self.counters().await?;
                serde_json::to_vec(&counters).map_err(CounterError::EncodeResponse)
            }
        }
    }
}
