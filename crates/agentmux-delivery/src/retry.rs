// SPDX-License-Identifier: MIT

//! `sendMessageWithRetry`: up to three attempts of a single delivery,
//! clearing leftover typed bytes and dismissing modals between failures.

use crate::engine::send_message_to_agent;
use crate::error::DeliveryError;
use agentmux_core::{model::RuntimeType, SessionName};
use agentmux_pty::{command, PtyBackend};
use agentmux_runtime::patterns::{last_non_empty_line, line_matches_prompt_chars};
use agentmux_runtime::RuntimePatterns;
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;

/// Deliver `text` to the session, retrying up to [`MAX_ATTEMPTS`] times on
/// failure. Between failing attempts: dismiss any modal with a single
/// `Escape` if the screen shows the runtime is not at prompt, then clear
/// the command line to drain leftover typed bytes.
pub async fn send_message_with_retry(
    backend: &dyn PtyBackend,
    patterns: &RuntimePatterns,
    name: &SessionName,
    text: &str,
    runtime_type: RuntimeType,
) -> Result<(), DeliveryError> {
    let mut last_err = DeliveryError::Failed("no attempts made".into());

    for attempt in 1..=MAX_ATTEMPTS {
        match send_message_to_agent(backend, patterns, name, text, runtime_type).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(session = %name, attempt, error = %e, "delivery attempt failed");
                last_err = e;

                if attempt < MAX_ATTEMPTS {
                    if let Some(session) = backend.get_session(name) {
                        let snapshot = command::capture_pane(session.as_ref(), 5);
                        let last_line = last_non_empty_line(&snapshot);
                        if !line_matches_prompt_chars(last_line, patterns.prompt_chars) {
                            let _ = command::send_escape(session.as_ref()).await;
                        }
                        let _ = command::clear_current_command_line(session.as_ref()).await;
                    }
                }
            }
        }
    }

    Err(last_err)
}
