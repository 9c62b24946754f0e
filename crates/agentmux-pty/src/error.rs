// SPDX-License-Identifier: MIT

//! Errors from PTY session operations (L1/L2).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already exists: {0}")]
    AlreadyExists(String),
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}
