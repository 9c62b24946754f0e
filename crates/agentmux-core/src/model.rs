// SPDX-License-Identifier: MIT

//! Core data model: agent identity, status, heartbeats, and the on-disk
//! team agent status file.

use crate::id::{AgentId, SessionName, TeamMemberId};
use crate::reserved::{is_orchestrator_session, ORCHESTRATOR_AGENT_ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which coding-assistant runtime is running inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeType {
    ClaudeCode,
    GeminiCli,
    CodexCli,
}

impl Default for RuntimeType {
    fn default() -> Self {
        RuntimeType::ClaudeCode
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeType::ClaudeCode => write!(f, "claude-code"),
            RuntimeType::GeminiCli => write!(f, "gemini-cli"),
            RuntimeType::CodexCli => write!(f, "codex-cli"),
        }
    }
}

impl std::str::FromStr for RuntimeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude-code" => Ok(RuntimeType::ClaudeCode),
            "gemini-cli" => Ok(RuntimeType::GeminiCli),
            "codex-cli" => Ok(RuntimeType::CodexCli),
            other => Err(format!("unknown runtime type: {other}")),
        }
    }
}

/// Identity assigned at session creation, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub agent_id: AgentId,
    pub session_name: SessionName,
    pub team_member_id: Option<TeamMemberId>,
    pub role: String,
    pub runtime_type: RuntimeType,
}

impl AgentIdentity {
    pub fn new(
        session_name: impl Into<SessionName>,
        role: impl Into<String>,
        runtime_type: RuntimeType,
        team_member_id: Option<TeamMemberId>,
    ) -> Self {
        let session_name = session_name.into();
        let agent_id = resolve_agent_id(session_name.as_str(), team_member_id.as_ref());
        Self {
            agent_id,
            session_name,
            team_member_id,
            role: role.into(),
            runtime_type,
        }
    }
}

/// Derive `agentId` from session name and optional team member id.
///
/// For the reserved orchestrator session name, `agentId` is always
/// `"orchestrator"` regardless of `team_member_id`. For any other session,
/// `agentId = team_member_id ?? session_name`.
pub fn resolve_agent_id(session_name: &str, team_member_id: Option<&TeamMemberId>) -> AgentId {
    if is_orchestrator_session(session_name) {
        return AgentId::new(ORCHESTRATOR_AGENT_ID);
    }
    match team_member_id {
        Some(id) => AgentId::new(id.as_str()),
        None => AgentId::new(session_name),
    }
}

/// Lifecycle status of an agent. Legal transitions are enforced by
/// callers (the supervisor and heartbeat store), not by this enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentStatus {
    /// No session, or explicitly terminated.
    Inactive,
    /// Caller intends to bring it up (set outside the core).
    Activating,
    /// PTY is live and runtime is ready, but no registration confirmation yet.
    Started,
    /// Runtime has called back into the system confirming it is online.
    Active,
    /// Last heartbeat older than the stale threshold; candidate for reaping.
    PotentialInactive,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentStatus::Inactive => "inactive",
            AgentStatus::Activating => "activating",
            AgentStatus::Started => "started",
            AgentStatus::Active => "active",
            AgentStatus::PotentialInactive => "potentialInactive",
        };
        write!(f, "{s}")
    }
}

/// A timestamped proof-of-life record for a single agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentHeartbeat {
    pub agent_id: AgentId,
    pub session_name: SessionName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_member_id: Option<TeamMemberId>,
    pub agent_status: AgentStatus,
    pub last_active_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentHeartbeat {
    /// Build a fresh heartbeat record for an agent's first observed update.
    pub fn new_at(
        agent_id: AgentId,
        session_name: SessionName,
        team_member_id: Option<TeamMemberId>,
        agent_status: AgentStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            agent_id,
            session_name,
            team_member_id,
            agent_status,
            last_active_time: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A coalesced update destined for the status file, produced by every
/// `updateAgentHeartbeat` call and consumed in batches by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedStatusUpdate {
    pub agent_id: AgentId,
    pub session_name: SessionName,
    pub team_member_id: Option<TeamMemberId>,
    pub agent_status: AgentStatus,
    pub timestamp: DateTime<Utc>,
}

/// Metadata stored alongside the agent records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFileMetadata {
    pub last_updated: DateTime<Utc>,
    pub version: String,
}

impl StatusFileMetadata {
    pub const CURRENT_VERSION: &'static str = "1.0.0";
}

/// The sole persisted artifact owned by the heartbeat store, matching the
/// `teamAgentStatus.json` wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAgentStatusFile {
    pub orchestrator: AgentHeartbeat,
    pub team_members: BTreeMap<String, AgentHeartbeat>,
    pub metadata: StatusFileMetadata,
}

impl TeamAgentStatusFile {
    /// Construct a fresh, empty status file at `now`.
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            orchestrator: AgentHeartbeat::new_at(
                AgentId::new(ORCHESTRATOR_AGENT_ID),
                SessionName::new(ORCHESTRATOR_AGENT_ID),
                None,
                AgentStatus::Inactive,
                now,
            ),
            team_members: BTreeMap::new(),
            metadata: StatusFileMetadata {
                last_updated: now,
                version: StatusFileMetadata::CURRENT_VERSION.to_string(),
            },
        }
    }

    /// Upsert a heartbeat from a flushed batch of updates.
    pub fn apply_update(&mut self, update: &BatchedStatusUpdate, now: DateTime<Utc>) {
        if update.agent_id.as_str() == ORCHESTRATOR_AGENT_ID {
            self.orchestrator.agent_status = update.agent_status;
            self.orchestrator.last_active_time = update.timestamp;
            self.orchestrator.session_name = update.session_name.clone();
            self.orchestrator.updated_at = now;
            return;
        }
        let key = update
            .team_member_id
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|| update.agent_id.as_str().to_string());
        let entry = self.team_members.entry(key).or_insert_with(|| {
            AgentHeartbeat::new_at(
                update.agent_id.clone(),
                update.session_name.clone(),
                update.team_member_id.clone(),
                update.agent_status,
                update.timestamp,
            )
        });
        entry.agent_status = update.agent_status;
        entry.last_active_time = update.timestamp;
        entry.session_name = update.session_name.clone();
        entry.team_member_id = update.team_member_id.clone();
        entry.updated_at = now;
    }

    /// Every agent record (orchestrator + team members) as `(agent_id, &AgentHeartbeat)`.
    pub fn all_heartbeats(&self) -> impl Iterator<Item = (&str, &AgentHeartbeat)> {
        std::iter::once((ORCHESTRATOR_AGENT_ID, &self.orchestrator))
            .chain(self.team_members.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentHeartbeat> {
        if agent_id == ORCHESTRATOR_AGENT_ID {
            Some(&self.orchestrator)
        } else {
            self.team_members.get(agent_id)
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
