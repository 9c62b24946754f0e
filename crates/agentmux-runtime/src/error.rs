// SPDX-License-Identifier: MIT

//! Errors from runtime-adapter operations. Every operation here is
//! best-effort by design; this enum only wraps the PTY layer's failures so
//! they don't propagate as panics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session error: {0}")]
    Session(#[from] agentmux_pty::SessionError),
}
