// SPDX-License-Identifier: MIT

//! Reserved names for the distinguished orchestrator agent.

/// Reserved `agentId` and `role` for the orchestrator.
pub const ORCHESTRATOR_AGENT_ID: &str = "orchestrator";

/// Reserved tmux/PTY session name for the orchestrator.
pub const ORCHESTRATOR_SESSION_NAME: &str = "orchestrator";

/// True if `session_name` is the reserved orchestrator session.
pub fn is_orchestrator_session(session_name: &str) -> bool {
    session_name == ORCHESTRATOR_SESSION_NAME
}
