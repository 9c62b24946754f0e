// SPDX-License-Identifier: MIT

//! Real PTY backend built on `portable-pty`, rendering the byte stream
//! through a `vt100::Parser` for screen snapshots.

use crate::backend::{PtyBackend, PtySessionHandle};
use crate::error::SessionError;
use agentmux_core::SessionName;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::debug;

const DEFAULT_COLS: u16 = 120;
const DEFAULT_ROWS: u16 = 40;
const SCROLLBACK_ROWS: usize = 2000;
const DATA_CHANNEL_CAPACITY: usize = 256;
const READ_CHUNK_SIZE: usize = 8192;
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Process-wide PTY backend. Construct once via [`PortablePtyBackend::new`]
/// and share behind an `Arc`; see `agentmux_pty::global` for the
/// convenience singleton accessor.
#[derive(Default)]
pub struct PortablePtyBackend {
    sessions: Mutex<HashMap<SessionName, Arc<PortablePtySession>>>,
}

impl PortablePtyBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PtyBackend for PortablePtyBackend {
    async fn create_session(
        &self,
        name: &SessionName,
        cwd: &Path,
        env: &[(String, String)],
    ) -> Result<Arc<dyn PtySessionHandle>, SessionError> {
        if self.session_exists(name) {
            return Err(SessionError::AlreadyExists(name.to_string()));
        }
        if !cwd.exists() {
            return Err(SessionError::SpawnFailed(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }

        let session = PortablePtySession::spawn(name.clone(), cwd.to_path_buf(), env)
            .await
            .map_err(SessionError::SpawnFailed)?;
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
        let session = self.sessions.lock().remove(name);
        match session {
            Some(session) => session.kill().await,
            None => Ok(()),
        }
    }
}

type BoxedChild = Box<dyn Child + Send + Sync>;

struct PortablePtySession {
    name: SessionName,
    cwd: PathBuf,
    created_at: Instant,
    pid: Option<u32>,
    writer: Mutex<Box<dyn Write + Send>>,
    master: Mutex<Box<dyn MasterPty + Send>>,
    parser: Arc<Mutex<vt100::Parser>>,
    data_tx: broadcast::Sender<Bytes>,
    exit_tx: watch::Sender<Option<i32>>,
    exit_rx: watch::Receiver<Option<i32>>,
    child: Arc<Mutex<Option<BoxedChild>>>,
}

impl PortablePtySession {
    async fn spawn(
        name: SessionName,
        cwd: PathBuf,
        env: &[(String, String)],
    ) -> Result<Arc<Self>, String> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: DEFAULT_ROWS,
                cols: DEFAULT_COLS,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| e.to_string())?;

        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        let mut cmd = CommandBuilder::new(shell);
        cmd.cwd(&cwd);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let child: BoxedChild = pair.slave.spawn_command(cmd).map_err(|e| e.to_string())?;
        let pid = child.process_id();
        drop(pair.slave);

        let writer = pair.master.take_writer().map_err(|e| e.to_string())?;
        let reader = pair.master.try_clone_reader().map_err(|e| e.to_string())?;

        let (data_tx, _) = broadcast::channel(DATA_CHANNEL_CAPACITY);
        let (exit_tx, exit_rx) = watch::channel(None);
        let parser = Arc::new(Mutex::new(vt100::Parser::new(
            DEFAULT_ROWS,
            DEFAULT_COLS,
            SCROLLBACK_ROWS,
        )));
        let child = Arc::new(Mutex::new(Some(child)));

        let session = Arc::new(Self {
            name: name.clone(),
            cwd,
            created_at: Instant::now(),
            pid,
            writer: Mutex::new(writer),
            master: Mutex::new(pair.master),
            parser: parser.clone(),
            data_tx: data_tx.clone(),
            exit_tx: exit_tx.clone(),
            exit_rx,
            child: child.clone(),
        });

        spawn_reader_task(name.clone(), reader, data_tx, parser);
        spawn_wait_task(name, child, exit_tx);

        Ok(session)
    }
}

/// Blocking reader loop, run on a dedicated thread since `portable-pty`'s
/// reader is a plain `std::io::Read`, not a tokio async source. Feeds the
/// vt100 parser and fans bytes out to subscribers until EOF.
fn spawn_reader_task(
    name: SessionName,
    mut reader: Box<dyn Read + Send>,
    data_tx: broadcast::Sender<Bytes>,
    parser: Arc<Mutex<vt100::Parser>>,
) {
    std::thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    parser.lock().process(&buf[..n]);
                    let _ = data_tx.send(Bytes::copy_from_slice(&buf[..n]));
                }
                Err(e) => {
                    debug!(session = %name, error = %e, "pty reader stopped");
                    break;
                }
            }
        }
        debug!(session = %name, "pty reader exiting (eof)");
    });
}

/// Polls (non-blocking) for the child to exit and publishes its exit code.
/// Uses `try_wait` rather than a single blocking `wait()` call so the lock
/// is never held across the whole child lifetime — `kill()` needs to be
/// able to take the child out from under this loop to signal it.
fn spawn_wait_task(
    name: SessionName,
    child: Arc<Mutex<Option<BoxedChild>>>,
    exit_tx: watch::Sender<Option<i32>>,
) {
    std::thread::spawn(move || loop {
        let status = {
            let mut guard = child.lock();
            match guard.as_mut() {
                Some(c) => match c.try_wait() {
                    Ok(Some(status)) => Some(status),
                    Ok(None) => None,
                    Err(_) => return,
                },
                // `kill()` already took the child; it will publish the
                // exit status itself once its own wait completes.
                None => return,
            }
        };
        match status {
            Some(status) => {
                *child.lock() = None;
                let code = status.exit_code() as i32;
                debug!(session = %name, exit_code = code, "pty child exited");
                let _ = exit_tx.send(Some(code));
                return;
            }
            None => std::thread::sleep(WAIT_POLL_INTERVAL),
        }
    });
}

#[async_trait]
impl PtySessionHandle for PortablePtySession {
    fn name(&self) -> &SessionName {
        &self.name
    }

    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn created_at(&self) -> Instant {
        self.created_at
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), SessionError> {
        let mut guard = self.writer.lock();
        guard
            .write_all(bytes)
            .and_then(|_| guard.flush())
            .map_err(|e| SessionError::CommandFailed(e.to_string()))
    }

    async fn resize(&self, cols: u16, rows: u16) -> Result<(), SessionError> {
        self.master
            .lock()
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SessionError::CommandFailed(e.to_string()))?;
        self.parser.lock().set_size(rows, cols);
        Ok(())
    }

    /// Signal the child, then block until its exit is actually observed —
    /// either by waiting on it directly here (if we won the race to take
    /// it from [`spawn_wait_task`]), or by waiting for that task's exit
    /// watch to fire (if it already took and reaped the child itself).
    async fn kill(&self) -> Result<(), SessionError> {
        let child = self.child.lock().take();
        if let Some(mut child) = child {
            if let Err(e) = child.kill() {
                debug!(session = %self.name, error = %e, "kill() on already-exited child (ignored)");
            }
            let name = self.name.clone();
            let exit_tx = self.exit_tx.clone();
            let _ = tokio::task::spawn_blocking(move || {
                let status = child.wait();
                let code = status.map(|s| s.exit_code() as i32).unwrap_or(-1);
                debug!(session = %name, exit_code = code, "pty child exited after kill");
                let _ = exit_tx.send(Some(code));
            })
            .await;
        }

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
        let parser = self.parser.lock();
        let contents = parser.screen().contents();
        let lines: Vec<&str> = contents.lines().collect();
        let start = lines.len().saturating_sub(last_n);
        lines[start..].join("\n")
    }
}
