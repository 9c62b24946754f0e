// SPDX-License-Identifier: MIT

//! The L1 PTY Session Backend contract: spawns and owns PTY processes,
//! offering write/resize/onData/onExit/snapshot/kill over a name-addressed
//! session table. Ownership is exclusive to the backend; callers only ever
//! hold a weak reference via [`agentmux_core::SessionName`].

use crate::error::SessionError;
use agentmux_core::SessionName;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch};

/// A live PTY session handle.
#[async_trait]
pub trait PtySessionHandle: Send + Sync {
    fn name(&self) -> &SessionName;
    fn pid(&self) -> Option<u32>;
    fn cwd(&self) -> &Path;
    fn created_at(&self) -> Instant;

    /// Write raw bytes into the PTY's stdin.
    async fn write(&self, bytes: &[u8]) -> Result<(), SessionError>;

    /// Resize the PTY's terminal dimensions.
    async fn resize(&self, cols: u16, rows: u16) -> Result<(), SessionError>;

    /// Kill the underlying process and await its exit. Idempotent.
    async fn kill(&self) -> Result<(), SessionError>;

    /// Subscribe to the raw output byte stream. Dropping the receiver
    /// unsubscribes — there is no separate unsubscribe call.
    fn subscribe_data(&self) -> broadcast::Receiver<Bytes>;

    /// Watch for process exit; carries `Some(exit_code)` once the process
    /// has exited, `None` while still running.
    fn subscribe_exit(&self) -> watch::Receiver<Option<i32>>;

    /// Render the last `last_n` visible rows of the terminal screen as text.
    /// A slow-path fallback for screen-state checks; callers should prefer
    /// the regex pattern matchers over scraping this text directly.
    fn snapshot(&self, last_n: usize) -> String;
}

/// The L1 PTY Session Backend: a process-wide singleton table of live
/// sessions, keyed by unique name.
#[async_trait]
pub trait PtyBackend: Send + Sync {
    /// Spawn a new session running the host's default shell in `cwd`.
    /// Fails with [`SessionError::AlreadyExists`] if `session_exists(name)`.
    async fn create_session(
        &self,
        name: &SessionName,
        cwd: &Path,
        env: &[(String, String)],
    ) -> Result<Arc<dyn PtySessionHandle>, SessionError>;

    /// Synchronous existence check.
    fn session_exists(&self, name: &SessionName) -> bool;

    /// Look up a live session by name.
    fn get_session(&self, name: &SessionName) -> Option<Arc<dyn PtySessionHandle>>;

    /// Signal and await exit; idempotent (no error if already gone).
    async fn kill_session(&self, name: &SessionName) -> Result<(), SessionError>;
}
