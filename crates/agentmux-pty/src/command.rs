// SPDX-License-Identifier: MIT

//! Session command helpers: small, composable keystroke-sending primitives
//! layered over a [`PtySessionHandle`]. Higher layers build delivery and
//! recovery flows out of these.

use crate::backend::PtySessionHandle;
use crate::error::SessionError;
use std::time::Duration;
use tokio::time::sleep;

const ESCAPE: &[u8] = b"\x1b";
const ENTER: &[u8] = b"\r";
const CTRL_C: &[u8] = b"\x03";
const KEY_PAUSE: Duration = Duration::from_millis(50);
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Send a literal key sequence with no trailing enter.
pub async fn send_key(session: &dyn PtySessionHandle, bytes: &[u8]) -> Result<(), SessionError> {
    session.write(bytes).await
}

pub async fn send_escape(session: &dyn PtySessionHandle) -> Result<(), SessionError> {
    session.write(ESCAPE).await
}

pub async fn send_enter(session: &dyn PtySessionHandle) -> Result<(), SessionError> {
    session.write(ENTER).await
}

pub async fn send_ctrl_c(session: &dyn PtySessionHandle) -> Result<(), SessionError> {
    session.write(CTRL_C).await
}

/// Clear whatever partial input sits on the current command line: two
/// escapes (dismiss any popup/menu), then Ctrl+C to abort, with short
/// settle pauses so the TUI has a chance to redraw between keystrokes.
pub async fn clear_current_command_line(
    session: &dyn PtySessionHandle,
) -> Result<(), SessionError> {
    send_escape(session).await?;
    sleep(KEY_PAUSE).await;
    send_escape(session).await?;
    sleep(KEY_PAUSE).await;
    send_ctrl_c(session).await?;
    sleep(KEY_PAUSE).await;
    Ok(())
}

/// Deliver a message to the session: clear the line, write the literal
/// text, wait for the TUI to settle, then press enter.
pub async fn send_message(
    session: &dyn PtySessionHandle,
    message: &str,
) -> Result<(), SessionError> {
    send_escape(session).await?;
    sleep(KEY_PAUSE).await;
    send_escape(session).await?;
    sleep(KEY_PAUSE).await;
    session.write(message.as_bytes()).await?;
    sleep(SETTLE_DELAY).await;
    send_enter(session).await
}

/// Set an environment variable for the session's running shell by typing
/// an `export` line. Used for one-off runtime configuration that must be
/// visible to the next command the agent runs.
pub async fn set_environment_variable(
    session: &dyn PtySessionHandle,
    key: &str,
    value: &str,
) -> Result<(), SessionError> {
    let line = format!("export {}={}", key, shell_quote(value));
    session.write(line.as_bytes()).await?;
    send_enter(session).await
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Render the last `last_n` rows of the session's terminal screen.
pub fn capture_pane(session: &dyn PtySessionHandle, last_n: usize) -> String {
    session.snapshot(last_n)
}
