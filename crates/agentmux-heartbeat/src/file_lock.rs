// SPDX-License-Identifier: MIT

//! Per-path write serialization: concurrent flushes targeting the same
//! status file queue behind the same `tokio::sync::Mutex` instead of
//! racing each other's temp-file rename.

use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct FileLockRegistry {
    locks: SyncMutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl FileLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the write lock for `path`, creating its entry on first use.
    /// The registry itself is never pruned: status files are few and
    /// long-lived for the process lifetime.
    pub async fn lock_for(&self, path: &Path) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .lock()
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
#[path = "file_lock_tests.rs"]
mod tests;
