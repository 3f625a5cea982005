// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Implements [`crate::store::WorldState`] on top of a directory, one file per key.

use std::{
    io::{self, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

use crate::store::{WithError, WorldState, WorldStateError};

#[cfg(test)]
#[path = "unit_tests/file_tests.rs"]
mod file_tests;

/// The prefix of every record file, so that the empty key still maps to a file.
const RECORD_FILE_PREFIX: &str = "state-";

/// The prefix of files being written and not yet renamed into place.
const PENDING_FILE_PREFIX: &str = ".";

/// The suffix of files being written and not yet renamed into place.
const PENDING_FILE_SUFFIX: &str = ".pending";

/// A world state stored in a directory.
///
/// Keys are hex-encoded into file names, so any string is a valid key. A record is first
/// written to a uniquely named pending file and then renamed, so readers never observe a
/// partial record, even when several handles or processes share the directory.
#[derive(Clone, Debug)]
pub struct FileWorldState {
    root: Arc<PathBuf>,
}

/// The error type for [`FileWorldState`].
#[derive(Error, Debug)]
pub enum FileWorldStateError {
    /// An I/O operation failed on the given path.
    #[error("I/O error on {path:?}")]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The blocking task writing a record panicked or was cancelled.
    #[error("The task writing key {key:?} did not complete")]
    Join {
        /// The key being written.
        key: String,
        /// The underlying error.
        #[source]
        error: tokio::task::JoinError,
    },
}

impl WorldStateError for FileWorldStateError {
    const BACKEND: &'static str = "file";
}

impl WithError for FileWorldState {
    type Error = FileWorldStateError;
}

impl FileWorldState {
    /// Opens the world state stored under `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, FileWorldStateError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|error| FileWorldStateError::Io {
                path: root.clone(),
                error,
            })?;
        tracing::debug!(root = ?root, "Opened file world state");
        Ok(FileWorldState {
            root: Arc::new(root),
        })
    }

    /// The directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{RECORD_FILE_PREFIX}{}", hex::encode(key)))
    }
}

/// Writes `value` to a fresh pending file in `root`, then renames it to `path`.
///
/// The pending file is removed if any step fails.
fn write_record(root: &Path, path: PathBuf, value: &[u8]) -> Result<(), FileWorldStateError> {
    let mut pending = tempfile::Builder::new()
        .prefix(PENDING_FILE_PREFIX)
        .suffix(PENDING_FILE_SUFFIX)
        .tempfile_in(root)
        .map_err(|error| FileWorldStateError::Io {
            path: root.to_path_buf(),
            error,
        })?;
    pending
        .write_all(value)
        .map_err(|error| FileWorldStateError::Io {
            path: pending.path().to_path_buf(),
            error,
        })?;
    pending
        .persist(&path)
        .map_err(|error| FileWorldStateError::Io {
            path,
            error: error.error,
        })?;
    Ok(())
}

impl WorldState for FileWorldState {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, FileWorldStateError> {
        let path = self.record_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(FileWorldStateError::Io { path, error }),
        }
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), FileWorldStateError> {
        let root = self.root.clone();
        let path = self.record_path(key);
        tokio::task::spawn_blocking(move || write_record(&root, path, &value))
            .await
            .map_err(|error| FileWorldStateError::Join {
                key: key.to_owned(),
                error,
            })?
    }
}
