// SPDX-License-Identifier: MIT

//! Home-directory resolution: `AGENTMUX_HOME` > `~/.agentmux`.

use crate::error::AgentMuxError;
use std::path::PathBuf;

/// Resolve the directory AgentMux keeps its on-disk state (agent status
/// file, prompt template overrides) under, creating it if missing.
pub fn home_dir() -> Result<PathBuf, AgentMuxError> {
    let dir = if let Ok(dir) = std::env::var("AGENTMUX_HOME") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir().ok_or(AgentMuxError::NoHomeDir)?.join(".agentmux")
    };
    std::fs::create_dir_all(&dir).map_err(agentmux_heartbeat::HeartbeatError::from)?;
    Ok(dir)
}

/// Path to the team agent status file under [`home_dir`].
pub fn status_file_path() -> Result<PathBuf, AgentMuxError> {
    Ok(home_dir()?.join("teamAgentStatus.json"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
