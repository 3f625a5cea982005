// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;

use super::*;

#[tokio::test]
async fn test_file_world_state_read_write() {
    let dir = tempfile::TempDir::new().unwrap();
    let state = FileWorldState::open(dir.path()).await.unwrap();

    assert_eq!(state.get_state("0").await.unwrap(), None);
    state.put_state("0", b"zero".to_vec()).await.unwrap();
    state.put_state("0", b"one".to_vec()).await.unwrap();
    assert_eq!(state.get_state("0").await.unwrap(), Some(b"one".to_vec()));
}

#[test_log::test(tokio::test)]
async fn test_file_world_state_survives_reopening() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let state = FileWorldState::open(dir.path()).await.unwrap();
        state.put_state("Home Worker/1", b"{}".to_vec()).await.unwrap();
        state.put_state("", b"empty key".to_vec()).await.unwrap();
    }
    let state = FileWorldState::open(dir.path()).await.unwrap();
    assert_eq!(
        state.get_state("Home Worker/1").await.unwrap(),
        Some(b"{}".to_vec())
    );
    assert_eq!(state.get_state("").await.unwrap(), Some(b"empty key".to_vec()));
}

#[tokio::test]
async fn test_file_world_state_leaves_no_pending_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let state = FileWorldState::open(dir.path().join("nested")).await.unwrap();
    state.put_state("2", b"student".to_vec()).await.unwrap();

    let names = std::fs::read_dir(state.root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![format!("{RECORD_FILE_PREFIX}{}", hex::encode("2"))]);
}

#[tokio::test]
async fn test_file_world_state_reports_path_on_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let result = FileWorldState::open(&blocker).await;
    assert_matches!(result, Err(FileWorldStateError::Io { path, .. }) if path == blocker);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_file_world_state_handles_sharing_a_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let first = FileWorldState::open(dir.path()).await.unwrap();
    let second = FileWorldState::open(dir.path()).await.unwrap();

    for round in 0..200u32 {
        let (left, right) = (first.clone(), second.clone());
        let writes = [
            tokio::spawn(async move { left.put_state("0", b"first".to_vec()).await }),
            tokio::spawn(async move { right.put_state("0", b"second".to_vec()).await }),
        ];
        for write in futures::future::join_all(writes).await {
            write.unwrap().unwrap_or_else(|error| panic!("round {round}: {error}"));
        }
        let record = first.get_state("0").await.unwrap().unwrap();
        assert!(record == b"first" || record == b"second");
    }

    let names = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![format!("{RECORD_FILE_PREFIX}{}", hex::encode("0"))]);
}

#[tokio::test]
async fn test_file_world_state_removes_pending_file_on_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let state = FileWorldState::open(dir.path()).await.unwrap();
    // A non-empty directory where the record should go makes the rename fail.
    let record = state.record_path("1");
    std::fs::create_dir(&record).unwrap();
    std::fs::write(record.join("occupant"), b"").unwrap();

    let result = state.put_state("1", b"home worker".to_vec()).await;
    assert_matches!(result, Err(FileWorldStateError::Io { path, .. }) if path == record);

    let names = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![format!("{RECORD_FILE_PREFIX}{}", hex::encode("1"))]);
}
