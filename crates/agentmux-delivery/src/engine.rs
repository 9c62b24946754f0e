// SPDX-License-Identifier: MIT

//! Event-driven reliable text delivery into an interactive TUI whose only
//! feedback is its own screen.
//!
//! A single attempt has to survive three pathological cases: the shell
//! isn't at a prompt yet, bracketed-paste eats the Enter that should have
//! committed the message, and (for Gemini) an alternate shell mode that
//! must be escaped before anything is typed.

use crate::error::DeliveryError;
use crate::ring_buffer::RingBuffer;
use agentmux_core::{model::RuntimeType, SessionName};
use agentmux_pty::PtyBackend;
use agentmux_pty::{command, PtySessionHandle};
use agentmux_runtime::RuntimePatterns;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

const RING_BUFFER_CAPACITY: usize = 8 * 1024;
const MAX_ENTER_RETRIES: u32 = 5;
const INITIAL_MESSAGE_DELAY: Duration = Duration::from_millis(300);
const PASTE_CHECK_DELAY: Duration = Duration::from_millis(300);
const ENTER_RETRY_DELAY: Duration = Duration::from_millis(400);
const GEMINI_SHELL_ESCAPE_MAX: u32 = 3;
const GEMINI_SHELL_ESCAPE_WAIT: Duration = Duration::from_millis(150);
const STUCK_PREFIX_LEN: usize = 20;

/// Total budget for a single delivery attempt's prompt detection and
/// retried-Enter loop. Overridable for tests that need to exercise the
/// timeout path without waiting out the production default.
fn prompt_detection_timeout() -> Duration {
    std::env::var("AGENTMUX_PROMPT_DETECTION_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_secs(20))
}

fn drain_available(
    rx: &mut tokio::sync::broadcast::Receiver<bytes::Bytes>,
    ring: &mut RingBuffer,
) {
    loop {
        match rx.try_recv() {
            Ok(bytes) => ring.push(&bytes),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}

fn stuck_probe_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > STUCK_PREFIX_LEN {
        trimmed.chars().take(STUCK_PREFIX_LEN).collect()
    } else {
        trimmed.to_string()
    }
}

/// Attempt to deliver `text` to the session named `name` exactly once.
/// `sendMessageWithRetry` wraps this with up to three attempts.
pub async fn send_message_to_agent(
    backend: &dyn PtyBackend,
    patterns: &RuntimePatterns,
    name: &SessionName,
    text: &str,
    runtime_type: RuntimeType,
) -> Result<(), DeliveryError> {
    if text.is_empty() {
        return Err(DeliveryError::InvalidArgument);
    }
    let session = backend
        .get_session(name)
        .ok_or_else(|| DeliveryError::SessionNotFound(name.to_string()))?;
    let session = session.as_ref();

    let deadline = Instant::now() + prompt_detection_timeout();

    // Step 1: pre-send mode fix for Gemini's alternate shell-mode prompt.
    if runtime_type == RuntimeType::GeminiCli {
        if let Some(shell_mode) = patterns.shell_mode {
            let mut escapes = 0;
            loop {
                let snapshot = command::capture_pane(session, 5);
                if !shell_mode.is_match(&snapshot) {
                    break;
                }
                if escapes >= GEMINI_SHELL_ESCAPE_MAX {
                    return Err(DeliveryError::Failed(
                        "runtime remained in shell mode after escape attempts".into(),
                    ));
                }
                command::send_escape(session).await?;
                escapes += 1;
                tokio::time::sleep(GEMINI_SHELL_ESCAPE_WAIT).await;
            }
        }
    }

    let mut ring = RingBuffer::new(RING_BUFFER_CAPACITY);
    let mut data_rx = session.subscribe_data();

    // Step 2: fast-path prompt-ready check.
    let snapshot = command::capture_pane(session, 5);
    let last_line = agentmux_runtime::patterns::last_non_empty_line(&snapshot);
    let mut ready = agentmux_runtime::patterns::line_matches_prompt_chars(last_line, patterns.prompt_chars);

    // Step 3: event-driven prompt wait.
    if !ready {
        ready = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break false;
            }
            tokio::select! {
                biased;
                recv = data_rx.recv() => {
                    match recv {
                        Ok(bytes) => {
                            ring.push(&bytes);
                            if ring.is_match(patterns.prompt_stream) {
                                break true;
                            }
                        }
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break false,
                    }
                }
                _ = tokio::time::sleep(remaining) => break false,
            }
        };
        if !ready {
            return Err(DeliveryError::Failed("prompt never became ready".into()));
        }
    }

    // Step 4: write the payload.
    drain_available(&mut data_rx, &mut ring);
    let offset_send = ring.offset();
    session.write(text.as_bytes()).await?;

    // Step 5: commit with retried Enter.
    let multiline = text.contains('\n');
    let mut enters_sent = 0u32;
    let mut processing_detected = false;

    for attempt in 0..MAX_ENTER_RETRIES {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if attempt == 0 {
            if multiline {
                tokio::time::sleep(PASTE_CHECK_DELAY.min(remaining)).await;
                drain_available(&mut data_rx, &mut ring);
                if patterns.paste_indicator.is_match(&ring.since(offset_send)) {
                    debug!(session = %name, "bracketed-paste indicator observed, continuing");
                }
            } else {
                tokio::time::sleep(INITIAL_MESSAGE_DELAY.min(remaining)).await;
            }
        } else {
            tokio::time::sleep(ENTER_RETRY_DELAY.min(remaining)).await;
        }

        command::send_enter(session).await?;
        enters_sent += 1;

        drain_available(&mut data_rx, &mut ring);
        let tail = ring.since(offset_send);
        if patterns.processing_indicators.iter().any(|re| re.is_match(&tail)) {
            processing_detected = true;
            break;
        }
    }

    // Step 6: stuck-at-prompt fallback.
    if !processing_detected && enters_sent > 0 {
        let snapshot = command::capture_pane(session, 5);
        let probe = stuck_probe_text(text);
        if !probe.is_empty() && snapshot.contains(&probe) {
            command::clear_current_command_line(session).await?;
            return Err(DeliveryError::Stuck);
        }
        return Ok(());
    }
    if processing_detected {
        return Ok(());
    }

    // Step 7: overall timeout — at-least-delivered semantics.
    if enters_sent > 0 {
        warn!(session = %name, "delivery timed out but at least one enter was sent");
        Ok(())
    } else {
        Err(DeliveryError::Failed(
            "delivery timed out before any enter was sent".into(),
        ))
    }
}

/// Reference to a session for callers that already hold one, avoiding a
/// second backend lookup inside helpers.
pub fn session_handle<'a>(
    backend: &'a dyn PtyBackend,
    name: &SessionName,
) -> Option<std::sync::Arc<dyn PtySessionHandle>> {
    backend.get_session(name)
}
