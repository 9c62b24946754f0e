// SPDX-License-Identifier: MIT

//! The Status Batcher (L6): coalesces per-agent updates in memory and
//! flushes them to disk either once `|pending| >= 50` or ~2s after the
//! first update in a batch, whichever comes first.

use crate::file_lock::FileLockRegistry;
use crate::persist;
use agentmux_core::model::BatchedStatusUpdate;
use agentmux_core::{AgentId, Clock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const SIZE_FLUSH_THRESHOLD: usize = 50;

fn batch_timer_delay() -> Duration {
    std::env::var("AGENTMUX_HEARTBEAT_BATCH_DELAY_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_secs(2))
}

pub struct StatusBatcher<C: Clock> {
    path: PathBuf,
    clock: C,
    locks: Arc<FileLockRegistry>,
    pending: Mutex<HashMap<AgentId, BatchedStatusUpdate>>,
    timer_armed: Mutex<bool>,
}

impl<C: Clock> StatusBatcher<C> {
    pub fn new(path: PathBuf, clock: C, locks: Arc<FileLockRegistry>) -> Arc<Self> {
        Arc::new(Self {
            path,
            clock,
            locks,
            pending: Mutex::new(HashMap::new()),
            timer_armed: Mutex::new(false),
        })
    }

    /// Add or overwrite the pending update for `update.agent_id`, flushing
    /// immediately if the size threshold is crossed, otherwise arming the
    /// one-shot flush timer.
    pub async fn enqueue(self: &Arc<Self>, update: BatchedStatusUpdate) {
        let should_flush_now = {
            let mut pending = self.pending.lock();
            pending.insert(update.agent_id.clone(), update);
            pending.len() >= SIZE_FLUSH_THRESHOLD
        };

        if should_flush_now {
            self.flush().await;
        } else {
            self.arm_timer();
        }
    }

    fn arm_timer(self: &Arc<Self>) {
        let mut armed = self.timer_armed.lock();
        if *armed {
            return;
        }
        *armed = true;
        drop(armed);

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(batch_timer_delay()).await;
            this.flush().await;
        });
    }

    /// Drain every pending update and persist them in one atomic write.
    /// A no-op if nothing is pending (a size-triggered flush may race a
    /// still-pending timer and find the map already drained).
    pub async fn flush(self: &Arc<Self>) {
        let batch: Vec<BatchedStatusUpdate> = {
            let mut pending = self.pending.lock();
            *self.timer_armed.lock() = false;
            pending.drain().map(|(_, v)| v).collect()
        };
        if batch.is_empty() {
            return;
        }

        let now = self.clock.utc_now();
        let mut file = match persist::load_status_file(&self.path, now) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to load status file for flush");
                return;
            }
        };
        for update in &batch {
            file.apply_update(update, now);
        }
        file.metadata.last_updated = now;

        if let Err(e) = persist::save_status_file(&self.path, &file, &self.locks).await {
            warn!(error = %e, path = %self.path.display(), "failed to persist flushed status batch");
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
#[path = "batcher_tests.rs"]
mod tests;
