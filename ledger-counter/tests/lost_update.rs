// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Concurrent increments of one key.
//!
//! The increment is a read followed by a write. Unless the host serializes them, two
//! increments running at the same time can both read the same count, and the second write
//! then discards the first update. These tests show the race happening and show the
//! per-key guard removing it when the host provides one.

use futures::future::join_all;
use ledger_counter::{Counter, CounterConfig, CounterService};
use ledger_host::{test_utils::InterleavingWorldState, MemoryWorldState, WorldState};

const CONCURRENT_INCREMENTS: u64 = 8;

async fn run_concurrent_increments<S: WorldState>(service: &CounterService<S>) -> u64 {
    service.initialize().await.unwrap();

    let increments = (0..CONCURRENT_INCREMENTS).map(|_| service.increment("0"));
    for result in join_all(increments).await {
        result.unwrap();
    }

    let bytes = service.state().get_state("0").await.unwrap().unwrap();
    let counter = Counter::from_bytes(&bytes).unwrap();
    assert_eq!(counter.name(), "Office Worker");
    counter.count()
}

#[test_log::test(tokio::test)]
async fn unserialized_increments_lose_updates() {
    let state = InterleavingWorldState::new(MemoryWorldState::default());
    let service = CounterService::new(state, CounterConfig::default());

    let count = run_concurrent_increments(&service).await;

    // Every increment read zero before any of them wrote.
    assert_eq!(count, 1);
}

#[test_log::test(tokio::test)]
async fn opting_in_without_host_support_still_loses_updates() {
    let state = InterleavingWorldState::new(MemoryWorldState::default());
    let config = CounterConfig {
        serialize_increments: true,
        ..CounterConfig::default()
    };
    let service = CounterService::new(state, config);

    let count = run_concurrent_increments(&service).await;

    assert!(count < CONCURRENT_INCREMENTS);
}

#[test_log::test(tokio::test)]
async fn host_serialization_is_unused_unless_configured() {
    let state = InterleavingWorldState::new(MemoryWorldState::with_key_serialization());
    let service = CounterService::new(state, CounterConfig::default());

    let count = run_concurrent_increments(&service).await;

    assert_eq!(count, 1);
}

#[test_log::test(tokio::test)]
async fn host_serialization_prevents_lost_updates() {
    let state = InterleavingWorldState::new(MemoryWorldState::with_key_serialization());
    let config = CounterConfig {
        serialize_increments: true,
        ..CounterConfig::default()
    };
    let service = CounterService::new(state, config);

    let count = run_concurrent_increments(&service).await;

    assert_eq!(count, CONCURRENT_INCREMENTS);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn host_serialization_holds_across_threads() {
    let config = CounterConfig {
        serialize_increments: true,
        ..CounterConfig::default()
    };
    let service = CounterService::new(MemoryWorldState::with_key_serialization(), config);
    service.initialize().await.unwrap();

    let tasks = (0..CONCURRENT_INCREMENTS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.increment("1").await })
        })
        .collect::<Vec<_>>();
    for task in join_all(tasks).await {
        task.unwrap().unwrap();
    }

    let counters = service.counters().await.unwrap();
    assert_eq!(counters[1].count(), CONCURRENT_INCREMENTS);
    assert_eq!(counters[0].count(), 0);
    assert_eq!(counters[2].count(), 0);
}
