// SPDX-License-Identifier: MIT

//! In-memory PTY backend for tests: no real process is spawned, writes are
//! recorded, and a test can push bytes or an exit code to drive the reader
//! side of the contract.

use crate::backend::{PtyBackend, PtySessionHandle};
use crate::error::SessionError;
use agentmux_core::SessionName;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch};

const DATA_CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
pub struct FakePtyBackend {
    sessions: Mutex<HashMap<SessionName, Arc<FakePtySession>>>,
}

impl FakePtyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the concrete fake session, for pushing bytes/exit codes in
    /// tests that need lower-level control than the `PtyBackend` trait
    /// exposes.
    pub fn fake_session(&self, name: &SessionName) -> Option<Arc<FakePtySession>> {
        self.sessions.lock().get(name).cloned()
    }
}

#[async_trait]
impl PtyBackend for FakePtyBackend {
    async fn create_session(
        &self,
        name: &SessionName,
        cwd: &Path,
        _env: &[(String, String)],
    ) -> Result<Arc<dyn PtySessionHandle>, SessionError> {
        if self.session_exists(name) {
            return Err(SessionError::AlreadyExists(name.to_string()));
        }
        let session = Arc::new(FakePtySession::new(name.clone(), cwd.to_path_buf()));
        self.sessions.lock().insert(name.clone(), session.clone());
        Ok(session)
    }

    fn session_exists(&self, name: &SessionName) -> bool {
        self.sessions.lock().contains_key(name)
    }

    fn get_session(&self, name: &SessionName) -> Option<Arc<dyn PtySessionHandle>> {
        self.sessions
            .lock()
            .get(name)
            .cloned()
            .map(|s| s as Arc<dyn PtySessionHandle>)
    }

    async fn kill_session(&self, name: &SessionName) -> Result<(), SessionError> {
        if let Some(session) = self.sessions.lock().remove(name) {
            session.kill().await?;
        }
        Ok(())
    }
}

pub struct FakePtySession {
    name: SessionName,
    cwd: PathBuf,
    created_at: Instant,
    written: Mutex<Vec<u8>>,
    screen: Mutex<String>,
    data_tx: broadcast::Sender<Bytes>,
    exit_tx: watch::Sender<Option<i32>>,
    exit_rx: watch::Receiver<Option<i32>>,
    killed: Mutex<bool>,
}

impl FakePtySession {
    fn new(name: SessionName, cwd: PathBuf) -> Self {
        let (data_tx, _) = broadcast::channel(DATA_CHANNEL_CAPACITY);
        let (exit_tx, exit_rx) = watch::channel(None);
        Self {
            name,
            cwd,
            created_at: Instant::now(),
            written: Mutex::new(Vec::new()),
            screen: Mutex::new(String::new()),
            data_tx,
            exit_tx,
            exit_rx,
            killed: Mutex::new(false),
        }
    }

    /// Everything ever written to this session's stdin, concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.written.lock().clone()
    }

    /// Simulate output arriving from the child process: updates the
    /// snapshot text and notifies data subscribers.
    pub fn push_output(&self, text: &str) {
        self.screen.lock().push_str(text);
        let _ = self.data_tx.send(Bytes::copy_from_slice(text.as_bytes()));
    }

    /// Replace the screen snapshot wholesale, as if the screen had been
    /// redrawn (e.g. on clear).
    pub fn set_screen(&self, text: &str) {
        *self.screen.lock() = text.to_string();
    }

    /// Simulate the child process exiting.
    pub fn simulate_exit(&self, code: i32) {
        let _ = self.exit_tx.send(Some(code));
    }

    pub fn was_killed(&self) -> bool {
        *self.killed.lock()
    }
}

#[async_trait]
impl PtySessionHandle for FakePtySession {
    fn name(&self) -> &SessionName {
        &self.name
    }

    fn pid(&self) -> Option<u32> {
        None
    }

    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn created_at(&self) -> Instant {
        self.created_at
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), SessionError> {
        self.written.lock().extend_from_slice(bytes);
        Ok(())
    }

    async fn resize(&self, _cols: u16, _rows: u16) -> Result<(), SessionError> {
        Ok(())
    }

    /// Signal and await exit, mirroring the real backend's contract: the
    /// exit watch must have fired before this returns.
    async fn kill(&self) -> Result<(), SessionError> {
        *self.killed.lock() = true;
        let _ = self.exit_tx.send(Some(0));

        let mut exit_rx = self.exit_rx.clone();
        while exit_rx.borrow().is_none() {
            if exit_rx.changed().await.is_err() {
                break;
            }
        }
        Ok(())
    }

    fn subscribe_data(&self) -> broadcast::Receiver<Bytes> {
        self.data_tx.subscribe()
    }

    fn subscribe_exit(&self) -> watch::Receiver<Option<i32>> {
        self.exit_rx.clone()
    }

    fn snapshot(&self, last_n: usize) -> String {
        let screen = self.screen.lock();
        let lines: Vec<&str> = screen.lines().collect();
        let start = lines.len().saturating_sub(last_n);
        lines[start..].join("\n")
    }
}
