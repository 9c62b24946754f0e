use crate::engine::send_message_to_agent;
use crate::error::DeliveryError;
use agentmux_core::model::RuntimeType;
use agentmux_core::SessionName;
use agentmux_pty::{FakePtyBackend, FakePtySession, PtyBackend};
use agentmux_runtime::patterns::{claude_code, gemini_cli};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_fake(backend: &FakePtyBackend, name: &str) -> (SessionName, Arc<FakePtySession>) {
    let session_name = SessionName::new(name);
    let dir = tempfile::tempdir().expect("tempdir");
    backend
        .create_session(&session_name, dir.path(), &[])
        .await
        .expect("create fake session");
    let fake = backend.fake_session(&session_name).expect("fake session handle");
    (session_name, fake)
}

#[tokio::test]
async fn delivers_message_and_detects_processing_indicator() {
    let backend = FakePtyBackend::new();
    let (name, fake) = spawn_fake(&backend, "deliver-happy").await;
    fake.set_screen("> ");

    let patterns = claude_code::patterns();
    let fake_for_task = fake.clone();
    let pusher = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        fake_for_task.push_output("thinking...");
    });

    let result = send_message_to_agent(&backend, &patterns, &name, "hello agent", RuntimeType::ClaudeCode).await;
    pusher.await.expect("pusher task");

    assert!(result.is_ok(), "expected delivery to succeed, got {result:?}");
    let written = String::from_utf8_lossy(&fake.written_bytes()).to_string();
    assert!(written.contains("hello agent"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let backend = FakePtyBackend::new();
    let (name, _fake) = spawn_fake(&backend, "deliver-empty").await;
    let patterns = claude_code::patterns();

    let result = send_message_to_agent(&backend, &patterns, &name, "", RuntimeType::ClaudeCode).await;
    assert_eq!(result, Err(DeliveryError::InvalidArgument));
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let backend = FakePtyBackend::new();
    let patterns = claude_code::patterns();
    let result = send_message_to_agent(
        &backend,
        &patterns,
        &SessionName::new("does-not-exist"),
        "hi",
        RuntimeType::ClaudeCode,
    )
    .await;
    assert!(matches!(result, Err(DeliveryError::SessionNotFound(_))));
}

#[tokio::test]
async fn stuck_text_triggers_clear_command_line_and_stuck_error() {
    let backend = FakePtyBackend::new();
    let (name, fake) = spawn_fake(&backend, "deliver-stuck").await;
    fake.set_screen("> stubborn message text here");

    let patterns = claude_code::patterns();
    let result = send_message_to_agent(
        &backend,
        &patterns,
        &name,
        "stubborn message text here",
        RuntimeType::ClaudeCode,
    )
    .await;

    assert_eq!(result, Err(DeliveryError::Stuck));
    let written = fake.written_bytes();
    assert!(written.contains(&0x03), "expected ctrl-c to have been sent on stuck detection");
}

#[tokio::test]
async fn gemini_shell_mode_escapes_before_writing_payload() {
    let backend = FakePtyBackend::new();
    let (name, fake) = spawn_fake(&backend, "deliver-shell-mode").await;
    fake.set_screen("\u{2502} ! \u{2502}");

    let patterns = gemini_cli::patterns();
    let result = send_message_to_agent(&backend, &patterns, &name, "hello", RuntimeType::GeminiCli).await;

    assert!(matches!(result, Err(DeliveryError::Failed(_))));
    let written = String::from_utf8_lossy(&fake.written_bytes()).to_string();
    assert!(!written.contains("hello"), "payload must not be written while stuck in shell mode");
    assert_eq!(written.matches('\x1b').count(), 3, "expected exactly 3 escape presses");
}
