// SPDX-License-Identifier: MIT

//! Top-level error aggregator for the wired-together subsystem.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentMuxError {
    #[error(transparent)]
    Session(#[from] agentmux_pty::SessionError),
    #[error(transparent)]
    Runtime(#[from] agentmux_runtime::RuntimeError),
    #[error(transparent)]
    Delivery(#[from] agentmux_delivery::DeliveryError),
    #[error(transparent)]
    Supervisor(#[from] agentmux_supervisor::SupervisorError),
    #[error(transparent)]
    Heartbeat(#[from] agentmux_heartbeat::HeartbeatError),
    #[error("no usable home directory: set AGENTMUX_HOME")]
    NoHomeDir,
}
