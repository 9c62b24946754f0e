use super::Orchestrator;
use agentmux_core::model::AgentStatus;
use agentmux_core::storage::fake::FakeStorageClient;
use agentmux_core::SessionName;
use agentmux_pty::{FakePtyBackend, PtyBackend};
use agentmux_supervisor::CreateAgentSessionParams;
use std::sync::Arc;

fn set_fast_timings() {
    std::env::set_var("AGENTMUX_STEP1_READY_BUDGET_MS", "50");
    std::env::set_var("AGENTMUX_READY_POLL_INTERVAL_MS", "10");
}

fn clear_fast_timings() {
    std::env::remove_var("AGENTMUX_STEP1_READY_BUDGET_MS");
    std::env::remove_var("AGENTMUX_READY_POLL_INTERVAL_MS");
}

#[tokio::test]
async fn create_agent_session_records_a_started_heartbeat() {
    set_fast_timings();

    let backend = Arc::new(FakePtyBackend::new());
    let storage = Arc::new(FakeStorageClient::new());
    let project_dir = tempfile::tempdir().expect("tempdir");
    let state_dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(
        backend.clone() as Arc<dyn PtyBackend>,
        storage,
        project_dir.path().to_path_buf(),
        state_dir.path().join("status.json"),
    );

    let name = SessionName::new("dev-1");
    // The backend has no session yet; `create_agent_session` creates one,
    // so arm the prompt readiness before awaiting it via a watcher.
    let backend_watcher = backend.clone();
    let name_watcher = name.clone();
    tokio::spawn(async move {
        loop {
            if let Some(session) = backend_watcher.fake_session(&name_watcher) {
                session.set_screen("> ");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    });

    let result = orchestrator
        .create_agent_session(CreateAgentSessionParams {
            session_name: name.clone(),
            role: "developer".to_string(),
            cwd: Some(project_dir.path().to_path_buf()),
            member_id: None,
            runtime_type: Some(agentmux_core::model::RuntimeType::ClaudeCode),
        })
        .await;

    clear_fast_timings();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    let hb = orchestrator.get_agent_heartbeat("dev-1").expect("heartbeat recorded");
    assert_eq!(hb.agent_status, AgentStatus::Started);
}

#[tokio::test]
async fn terminate_marks_heartbeat_inactive() {
    let backend = Arc::new(FakePtyBackend::new());
    let storage = Arc::new(FakeStorageClient::new());
    let project_dir = tempfile::tempdir().expect("tempdir");
    let state_dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(
        backend.clone() as Arc<dyn PtyBackend>,
        storage,
        project_dir.path().to_path_buf(),
        state_dir.path().join("status.json"),
    );

    let name = SessionName::new("dev-2");
    backend.create_session(&name, project_dir.path(), &[]).await.expect("create");

    orchestrator.terminate_agent_session(&name).await.expect("terminate");

    let hb = orchestrator.get_agent_heartbeat("dev-2").expect("heartbeat recorded");
    assert_eq!(hb.agent_status, AgentStatus::Inactive);
}

#[tokio::test]
async fn detect_stale_agents_delegates_to_the_heartbeat_store() {
    let backend = Arc::new(FakePtyBackend::new());
    let storage = Arc::new(FakeStorageClient::new());
    let project_dir = tempfile::tempdir().expect("tempdir");
    let state_dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(
        backend as Arc<dyn PtyBackend>,
        storage,
        project_dir.path().to_path_buf(),
        state_dir.path().join("status.json"),
    );

    let name = SessionName::new("dev-3");
    orchestrator.update_agent_heartbeat(&name, None, AgentStatus::Active).await;
    orchestrator.flush_heartbeats().await;

    let stale = orchestrator.detect_stale_agents(std::time::Duration::from_secs(0));
    assert!(stale.contains(&"dev-3".to_string()));
}
