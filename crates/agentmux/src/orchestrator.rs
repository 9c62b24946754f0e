// SPDX-License-Identifier: MIT

//! The `Orchestrator`: a thin facade wiring the Lifecycle Supervisor (L4)
//! and the Heartbeat Store (L5/L6) on top of a shared PTY backend and a
//! caller-supplied Storage collaborator. Every tool call that touches an
//! agent session goes through here so the two layers stay in sync —
//! session-lifecycle calls update the on-disk heartbeat just like a
//! successful registration marks the agent `started`.

use crate::error::AgentMuxError;
use agentmux_core::model::{AgentHeartbeat, AgentStatus, RuntimeType};
use agentmux_core::{Clock, SessionName, StorageClient, SystemClock, TeamMemberId};
use agentmux_heartbeat::HeartbeatStore;
use agentmux_pty::PtyBackend;
use agentmux_supervisor::{CreateAgentSessionParams, Supervisor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct Orchestrator<S: StorageClient, C: Clock = SystemClock> {
    supervisor: Supervisor<S>,
    heartbeat: HeartbeatStore<C>,
}

impl<S: StorageClient> Orchestrator<S, SystemClock> {
    pub fn new(
        backend: Arc<dyn PtyBackend>,
        storage: Arc<S>,
        project_root: PathBuf,
        status_file_path: PathBuf,
    ) -> Self {
        Self::with_clock(backend, storage, project_root, status_file_path, SystemClock)
    }
}

impl<S: StorageClient, C: Clock> Orchestrator<S, C> {
    pub fn with_clock(
        backend: Arc<dyn PtyBackend>,
        storage: Arc<S>,
        project_root: PathBuf,
        status_file_path: PathBuf,
        clock: C,
    ) -> Self {
        Self {
            supervisor: Supervisor::new(backend, storage, project_root),
            heartbeat: HeartbeatStore::with_clock(status_file_path, clock),
        }
    }

    /// Create (or recover) an agent session, then record its first
    /// heartbeat once registration succeeds.
    pub async fn create_agent_session(&self, params: CreateAgentSessionParams) -> Result<String, AgentMuxError> {
        let session_name = params.session_name.clone();
        let member_id = params.member_id.clone();
        let message = self.supervisor.create_agent_session(params).await?;
        self.heartbeat
            .update_agent_heartbeat(&session_name, member_id.as_ref(), AgentStatus::Started)
            .await;
        Ok(message)
    }

    pub async fn terminate_agent_session(&self, session_name: &SessionName) -> Result<(), AgentMuxError> {
        self.supervisor.terminate_agent_session(session_name).await?;
        self.heartbeat
            .update_agent_heartbeat(session_name, None, AgentStatus::Inactive)
            .await;
        Ok(())
    }

    pub async fn send_message_to_agent(
        &self,
        session_name: &SessionName,
        text: &str,
        runtime_type: Option<RuntimeType>,
    ) -> Result<(), AgentMuxError> {
        self.supervisor
            .send_message_to_agent(session_name, text, runtime_type)
            .await?;
        self.heartbeat
            .update_agent_heartbeat(session_name, None, AgentStatus::Active)
            .await;
        Ok(())
    }

    pub async fn send_key_to_agent(&self, session_name: &SessionName, key: &[u8]) -> Result<(), AgentMuxError> {
        self.supervisor.send_key_to_agent(session_name, key).await?;
        Ok(())
    }

    pub async fn check_agent_health(&self, session_name: &SessionName, timeout: Duration) -> bool {
        self.supervisor.check_agent_health(session_name, timeout).await
    }

    /// Record a bare proof-of-life without any session-lifecycle action —
    /// the entry point MCP tool calls use on every turn.
    pub async fn update_agent_heartbeat(
        &self,
        session_name: &SessionName,
        team_member_id: Option<&TeamMemberId>,
        agent_status: AgentStatus,
    ) {
        self.heartbeat
            .update_agent_heartbeat(session_name, team_member_id, agent_status)
            .await;
    }

    pub async fn flush_heartbeats(&self) {
        self.heartbeat.flush().await;
    }

    pub fn detect_stale_agents(&self, threshold: Duration) -> Vec<String> {
        self.heartbeat.detect_stale_agents(threshold)
    }

    pub fn get_agent_heartbeat(&self, agent_id: &str) -> Option<AgentHeartbeat> {
        self.heartbeat.get_agent_heartbeat(agent_id)
    }

    pub fn get_all_agent_heartbeats(&self) -> Vec<AgentHeartbeat> {
        self.heartbeat.get_all_agent_heartbeats()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
