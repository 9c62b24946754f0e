//! End-to-end scenarios exercising the full `Orchestrator` facade: PTY
//! backend, runtime adapters, delivery engine, supervisor escalation, and
//! heartbeat batching wired together exactly as a host process would use
//! them, with fakes standing in for the PTY and Storage collaborators.

use agentmux::core::model::{AgentStatus, RuntimeType};
use agentmux::core::storage::fake::FakeStorageClient;
use agentmux::core::SessionName;
use agentmux::pty::{FakePtyBackend, PtyBackend};
use agentmux::Orchestrator;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(
    backend: Arc<FakePtyBackend>,
    project_dir: &std::path::Path,
    status_path: std::path::PathBuf,
) -> Orchestrator<FakeStorageClient> {
    let storage = Arc::new(FakeStorageClient::new());
    Orchestrator::new(backend as Arc<dyn PtyBackend>, storage, project_dir.to_path_buf(), status_path)
}

/// A message that first gets stuck at the prompt (the runtime never
/// processed it) recovers on a later retry once the prompt clears, rather
/// than surfacing the stuck error to the caller.
#[tokio::test]
async fn delivery_stuck_then_recovered() {
    let backend = Arc::new(FakePtyBackend::new());
    let project_dir = tempfile::tempdir().expect("tempdir");
    let state_dir = tempfile::tempdir().expect("tempdir");
    let o = orchestrator(backend.clone(), project_dir.path(), state_dir.path().join("status.json"));

    let name = SessionName::new("stuck-then-ok");
    backend
        .create_session(&name, project_dir.path(), &[])
        .await
        .expect("create session");
    let fake = backend.fake_session(&name).expect("fake session");
    let message = "stubborn message text here";
    fake.set_screen(&format!("> {message}"));

    // Once the stuck-detection path clears the line (a Ctrl+C lands in the
    // written stream), simulate the TUI recovering to a clean prompt so
    // the next retry attempt succeeds instead of getting stuck again.
    let fake_watch = fake.clone();
    tokio::spawn(async move {
        loop {
            if fake_watch.written_bytes().contains(&0x03) {
                fake_watch.set_screen("> ");
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let result = o
        .send_message_to_agent(&name, message, Some(RuntimeType::ClaudeCode))
        .await;

    assert!(result.is_ok(), "delivery should recover on retry, got {result:?}");
    let hb = o.get_agent_heartbeat("stuck-then-ok").expect("heartbeat recorded on success");
    assert_eq!(hb.agent_status, AgentStatus::Active);
}

/// Gemini's alternate shell-mode prompt is escaped before anything is
/// typed; once the screen shows it has left shell mode, delivery proceeds
/// rather than exhausting the escape budget and failing.
#[tokio::test]
async fn gemini_shell_mode_is_escaped_then_delivered() {
    let backend = Arc::new(FakePtyBackend::new());
    let project_dir = tempfile::tempdir().expect("tempdir");
    let state_dir = tempfile::tempdir().expect("tempdir");
    let o = orchestrator(backend.clone(), project_dir.path(), state_dir.path().join("status.json"));

    let name = SessionName::new("gemini-shell-mode");
    backend
        .create_session(&name, project_dir.path(), &[])
        .await
        .expect("create session");
    let fake = backend.fake_session(&name).expect("fake session");
    fake.set_screen("\u{2502} ! \u{2502}");

    let fake_watch = fake.clone();
    tokio::spawn(async move {
        loop {
            if fake_watch.written_bytes().contains(&0x1b) {
                fake_watch.set_screen("> ");
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let result = o.send_message_to_agent(&name, "hello", Some(RuntimeType::GeminiCli)).await;

    assert!(result.is_ok(), "expected delivery to succeed after leaving shell mode, got {result:?}");
    let written = String::from_utf8_lossy(&fake.written_bytes()).to_string();
    assert!(written.contains("hello"));
}

/// 200 heartbeat updates across 10 agents inside a ~100ms window coalesce
/// down to a small number of flushes, and every agent's on-disk record
/// reflects its last update.
#[tokio::test]
async fn heartbeat_batching_under_storm() {
    let backend = Arc::new(FakePtyBackend::new());
    let project_dir = tempfile::tempdir().expect("tempdir");
    let state_dir = tempfile::tempdir().expect("tempdir");
    let o = orchestrator(backend, project_dir.path(), state_dir.path().join("status.json"));

    let agents: Vec<SessionName> = (0..10).map(|i| SessionName::new(format!("storm-{i}"))).collect();
    for round in 0..20 {
        for agent in &agents {
            let status = if round % 2 == 0 { AgentStatus::Active } else { AgentStatus::PotentialInactive };
            o.update_agent_heartbeat(agent, None, status).await;
        }
    }
    o.flush_heartbeats().await;

    let all = o.get_all_agent_heartbeats();
    // 10 storm agents plus the default orchestrator record.
    assert_eq!(all.len(), 11);
    for agent in &agents {
        let hb = o.get_agent_heartbeat(agent.as_str()).expect("agent heartbeat present");
        assert_eq!(hb.agent_status, AgentStatus::PotentialInactive, "last write for {agent} should win");
    }
}
