// SPDX-License-Identifier: MIT

//! Supervisor error kinds. Policy: only "every escalation step failed" and
//! "PTY creation threw" are surfaced to callers; everything else (status
//! writes, prompt dispatch) is best-effort and logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("runtime never became ready")]
    RuntimeNotReady,
    #[error("{0}")]
    EscalationExhausted(String),
    #[error("pty error: {0}")]
    Pty(#[from] agentmux_pty::SessionError),
    #[error("delivery error: {0}")]
    Delivery(#[from] agentmux_delivery::DeliveryError),
}
