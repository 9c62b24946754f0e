// SPDX-License-Identifier: MIT

//! The Heartbeat & Agent-Status Store (L5): the single entry point every
//! tool call uses to record proof-of-life, plus read-only stale detection
//! and lookup APIs. Writes go through the [`StatusBatcher`]; reads go
//! straight through the same atomic-replace file.

use crate::batcher::StatusBatcher;
use crate::file_lock::FileLockRegistry;
use crate::persist;
use agentmux_core::model::{AgentHeartbeat, AgentStatus, BatchedStatusUpdate};
use agentmux_core::{resolve_agent_id, Clock, SessionName, SystemClock, TeamMemberId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub fn default_stale_threshold() -> Duration {
    std::env::var("AGENTMUX_STALE_THRESHOLD_MINUTES")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(|m| Duration::from_secs(m * 60))
        .unwrap_or_else(|| Duration::from_secs(30 * 60))
}

pub struct HeartbeatStore<C: Clock = SystemClock> {
    path: PathBuf,
    clock: C,
    batcher: Arc<StatusBatcher<C>>,
}

impl HeartbeatStore<SystemClock> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }
}

impl<C: Clock> HeartbeatStore<C> {
    pub fn with_clock(path: impl Into<PathBuf>, clock: C) -> Self {
        let path = path.into();
        let locks = Arc::new(FileLockRegistry::new());
        let batcher = StatusBatcher::new(path.clone(), clock.clone(), locks);
        Self { path, clock, batcher }
    }

    /// The single entry point every tool call records a proof-of-life
    /// through. Most callers pass [`AgentStatus::Active`].
    pub async fn update_agent_heartbeat(
        &self,
        session_name: &SessionName,
        team_member_id: Option<&TeamMemberId>,
        agent_status: AgentStatus,
    ) {
        let agent_id = resolve_agent_id(session_name.as_str(), team_member_id);
        let update = BatchedStatusUpdate {
            agent_id,
            session_name: session_name.clone(),
            team_member_id: team_member_id.cloned(),
            agent_status,
            timestamp: self.clock.utc_now(),
        };
        self.batcher.enqueue(update).await;
    }

    /// Force any pending batch to disk now, bypassing the size/time
    /// triggers. Mainly useful for tests and graceful shutdown.
    pub async fn flush(&self) {
        self.batcher.flush().await;
    }

    /// Every currently-`active` agent whose `lastActiveTime` is older than
    /// `threshold`. Read-only: never mutates the file.
    pub fn detect_stale_agents(&self, threshold: Duration) -> Vec<String> {
        let now = self.clock.utc_now();
        let file = match persist::load_status_file(&self.path, now) {
            Ok(file) => file,
            Err(_) => return Vec::new(),
        };
        let threshold = chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::zero());
        file.all_heartbeats()
            .filter(|(_, hb)| hb.agent_status == AgentStatus::Active && now - hb.last_active_time > threshold)
            .map(|(id, _)| id.to_string())
            .collect()
    }

    pub fn get_agent_heartbeat(&self, agent_id: &str) -> Option<AgentHeartbeat> {
        let now = self.clock.utc_now();
        persist::load_status_file(&self.path, now).ok()?.get(agent_id).cloned()
    }

    pub fn get_all_agent_heartbeats(&self) -> Vec<AgentHeartbeat> {
        let now = self.clock.utc_now();
        persist::load_status_file(&self.path, now)
            .map(|file| file.all_heartbeats().map(|(_, hb)| hb.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
