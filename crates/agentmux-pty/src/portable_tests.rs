use crate::portable::PortablePtyBackend;
use crate::PtyBackend;
use agentmux_core::SessionName;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn spawns_and_echoes_output() {
    let backend = PortablePtyBackend::new();
    let dir = tempfile::tempdir().expect("tempdir");
    let name = SessionName::new("pty-echo-test");

    let session = backend
        .create_session(&name, dir.path(), &[])
        .await
        .expect("spawn");

    session
        .write(b"echo agentmux-pty-marker\n")
        .await
        .expect("write");
    sleep(Duration::from_millis(300)).await;

    let snapshot = session.snapshot(40);
    assert!(
        snapshot.contains("agentmux-pty-marker"),
        "snapshot did not contain expected output: {snapshot}"
    );

    backend.kill_session(&name).await.expect("kill");
}

#[tokio::test]
async fn duplicate_session_name_is_rejected() {
    let backend = PortablePtyBackend::new();
    let dir = tempfile::tempdir().expect("tempdir");
    let name = SessionName::new("pty-dup-test");

    backend
        .create_session(&name, dir.path(), &[])
        .await
        .expect("first spawn");
    let second = backend.create_session(&name, dir.path(), &[]).await;
    assert!(second.is_err());

    backend.kill_session(&name).await.expect("kill");
}

#[tokio::test]
async fn missing_cwd_is_rejected() {
    let backend = PortablePtyBackend::new();
    let name = SessionName::new("pty-missing-cwd");
    let result = backend
        .create_session(&name, std::path::Path::new("/no/such/dir/agentmux"), &[])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn kill_blocks_until_exit_is_observed() {
    let backend = PortablePtyBackend::new();
    let dir = tempfile::tempdir().expect("tempdir");
    let name = SessionName::new("pty-kill-blocks");

    let session = backend.create_session(&name, dir.path(), &[]).await.expect("spawn");
    let mut exit_rx = session.subscribe_exit();
    assert!(exit_rx.borrow().is_none(), "child should not have exited before kill");

    backend.kill_session(&name).await.expect("kill");

    assert!(
        exit_rx.borrow_and_update().is_some(),
        "kill() returned before the exit watch fired"
    );
}

#[tokio::test]
async fn kill_is_idempotent() {
    let backend = PortablePtyBackend::new();
    let dir = tempfile::tempdir().expect("tempdir");
    let name = SessionName::new("pty-kill-idempotent");

    backend
        .create_session(&name, dir.path(), &[])
        .await
        .expect("spawn");
    backend.kill_session(&name).await.expect("first kill");
    backend.kill_session(&name).await.expect("second kill");
    assert!(!backend.session_exists(&name));
}
