// SPDX-License-Identifier: MIT

//! Delivery-engine error kinds.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("message text must be non-empty")]
    InvalidArgument,
    #[error("session not found: {0}")]
    SessionNotFound(String),
    /// Delivery failed because the typed text remained visible at the
    /// prompt with no processing indicator observed.
    #[error("delivery failed: message stuck at prompt")]
    Stuck,
    #[error("delivery failed: {0}")]
    Failed(String),
}

impl From<agentmux_pty::SessionError> for DeliveryError {
    fn from(e: agentmux_pty::SessionError) -> Self {
        DeliveryError::Failed(e.to_string())
    }
}
