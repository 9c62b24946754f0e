// SPDX-License-Identifier: MIT

//! The Storage collaborator: persistent domain stores for
//! Teams/Projects/Assignments. Explicitly out of scope for this crate's
//! implementation — only the interface the core consumes is defined here.

use crate::model::{AgentStatus, RuntimeType};
use async_trait::async_trait;

/// A team member record as seen by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub session_name: String,
    pub role: String,
    pub agent_status: AgentStatus,
    pub runtime_type: Option<RuntimeType>,
}

/// A team as seen by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub members: Vec<TeamMember>,
}

/// Status of the distinguished orchestrator agent as tracked by Storage.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorStatus {
    pub agent_status: AgentStatus,
    pub runtime_type: Option<RuntimeType>,
}

/// Interface the core calls into for the external Storage collaborator.
/// No production implementation ships in this workspace.
#[async_trait]
pub trait StorageClient: Send + Sync + 'static {
    async fn get_teams(&self) -> Vec<Team>;
    async fn get_orchestrator_status(&self) -> Option<OrchestratorStatus>;
    async fn update_agent_status(&self, session_name: &str, status: AgentStatus);
    async fn update_orchestrator_status(&self, status: AgentStatus);
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// In-memory `StorageClient` for tests, recording every call it receives.
    #[derive(Clone, Default)]
    pub struct FakeStorageClient {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Default)]
    struct Inner {
        teams: Vec<Team>,
        orchestrator_status: Option<OrchestratorStatus>,
        agent_status_calls: Vec<(String, AgentStatus)>,
        orchestrator_status_calls: Vec<AgentStatus>,
        preferred_runtime: HashMap<String, RuntimeType>,
    }

    impl FakeStorageClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_teams(self, teams: Vec<Team>) -> Self {
            self.inner.lock().teams = teams;
            self
        }

        pub fn with_orchestrator_status(self, status: OrchestratorStatus) -> Self {
            self.inner.lock().orchestrator_status = Some(status);
            self
        }

        pub fn set_preferred_runtime(&self, session_name: &str, runtime: RuntimeType) {
            self.inner
                .lock()
                .preferred_runtime
                .insert(session_name.to_string(), runtime);
        }

        pub fn agent_status_calls(&self) -> Vec<(String, AgentStatus)> {
            self.inner.lock().agent_status_calls.clone()
        }

        pub fn orchestrator_status_calls(&self) -> Vec<AgentStatus> {
            self.inner.lock().orchestrator_status_calls.clone()
        }

        pub fn preferred_runtime_for(&self, session_name: &str) -> Option<RuntimeType> {
            self.inner.lock().preferred_runtime.get(session_name).copied()
        }
    }

    #[async_trait]
    impl StorageClient for FakeStorageClient {
        async fn get_teams(&self) -> Vec<Team> {
            self.inner.lock().teams.clone()
        }

        async fn get_orchestrator_status(&self) -> Option<OrchestratorStatus> {
            self.inner.lock().orchestrator_status.clone()
        }

        async fn update_agent_status(&self, session_name: &str, status: AgentStatus) {
            self.inner
                .lock()
                .agent_status_calls
                .push((session_name.to_string(), status));
        }

        async fn update_orchestrator_status(&self, status: AgentStatus) {
            self.inner.lock().orchestrator_status_calls.push(status);
        }
    }
}
