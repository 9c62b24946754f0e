// SPDX-License-Identifier: MIT

//! The Lifecycle Supervisor: a 2-step escalation ladder that brings a
//! session into the registered state, a recovery path for sessions that
//! already exist, and thin pass-through operations over the lower layers.

use crate::config;
use crate::error::SupervisorError;
use crate::prompts::{render_prompt, PromptCache};
use agentmux_core::model::{AgentStatus, RuntimeType};
use agentmux_core::reserved::is_orchestrator_session;
use agentmux_core::{SessionName, StorageClient, TeamMemberId};
use agentmux_pty::{command, PtyBackend};
use agentmux_runtime::{adapter_for, RuntimePatterns};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

const ORCHESTRATOR_ROLE: &str = "orchestrator";

fn patterns_for(runtime_type: RuntimeType) -> RuntimePatterns {
    *adapter_for(runtime_type).patterns()
}

/// Parameters for creating or recovering an agent session.
pub struct CreateAgentSessionParams {
    pub session_name: SessionName,
    pub role: String,
    pub cwd: Option<PathBuf>,
    pub member_id: Option<TeamMemberId>,
    pub runtime_type: Option<RuntimeType>,
}

pub struct Supervisor<S: StorageClient> {
    backend: Arc<dyn PtyBackend>,
    storage: Arc<S>,
    project_root: PathBuf,
    prompts: Arc<PromptCache>,
}

impl<S: StorageClient> Supervisor<S> {
    pub fn new(backend: Arc<dyn PtyBackend>, storage: Arc<S>, project_root: PathBuf) -> Self {
        Self {
            backend,
            storage,
            project_root,
            prompts: Arc::new(PromptCache::new()),
        }
    }

    /// Resolve the runtime type for a session when the caller did not
    /// specify one: team members consult their preferred runtime, the
    /// orchestrator consults its status record, default `claude-code`.
    pub async fn resolve_runtime_type(&self, session_name: &SessionName, role: &str) -> RuntimeType {
        if role == ORCHESTRATOR_ROLE || is_orchestrator_session(session_name.as_str()) {
            if let Some(status) = self.storage.get_orchestrator_status().await {
                if let Some(rt) = status.runtime_type {
                    return rt;
                }
            }
            return RuntimeType::default();
        }
        for team in self.storage.get_teams().await {
            for member in team.members {
                if member.session_name == session_name.as_str() {
                    if let Some(rt) = member.runtime_type {
                        return rt;
                    }
                }
            }
        }
        RuntimeType::default()
    }

    fn session_cwd(&self, role: &str, cwd: Option<&Path>) -> PathBuf {
        if role == ORCHESTRATOR_ROLE {
            self.project_root.clone()
        } else {
            cwd.map(Path::to_path_buf).unwrap_or_else(|| self.project_root.clone())
        }
    }

    /// Fire-and-forget dispatch of the registration prompt. Failures are
    /// logged, never surfaced — the caller has already returned `ok`.
    fn dispatch_registration_prompt_async(
        &self,
        session_name: SessionName,
        role: String,
        member_id: Option<TeamMemberId>,
        runtime_type: RuntimeType,
    ) {
        let backend = self.backend.clone();
        let prompts = self.prompts.clone();
        let project_root = self.project_root.clone();
        tokio::spawn(async move {
            let template = prompts.load(&project_root, &role, member_id.is_some());
            let text = render_prompt(&template, session_name.as_str(), member_id.as_ref().map(|m| m.as_str()));
            let patterns = patterns_for(runtime_type);
            if let Err(e) =
                agentmux_delivery::send_message_with_retry(backend.as_ref(), &patterns, &session_name, &text, runtime_type)
                    .await
            {
                warn!(session = %session_name, error = %e, "registration prompt dispatch failed");
            }
        });
    }

    async fn mark_started(&self, session_name: &SessionName) {
        self.storage
            .update_agent_status(session_name.as_str(), AgentStatus::Started)
            .await;
    }

    /// The 2-step escalation ladder. Assumes a PTY session already exists.
    pub async fn initialize_agent_with_registration(
        &self,
        session_name: &SessionName,
        role: &str,
        cwd: Option<&Path>,
        total_timeout: Duration,
        member_id: Option<TeamMemberId>,
        runtime_type: RuntimeType,
    ) -> Result<String, SupervisorError> {
        let start = Instant::now();
        let deadline = start + total_timeout;
        let create_cwd = self.session_cwd(role, cwd);

        // Step 1 — cleanup & reinit.
        if let Some(session) = self.backend.get_session(session_name) {
            let _ = command::clear_current_command_line(session.as_ref()).await;
        }
        let adapter = adapter_for(runtime_type);
        let _ = adapter
            .execute_runtime_init_script(self.backend.as_ref(), session_name, &create_cwd)
            .await;
        let step1_ready_budget = step1_budget_within(deadline);
        let ready = adapter
            .wait_for_runtime_ready(self.backend.as_ref(), session_name, step1_ready_budget, config::poll_interval())
            .await;
        if ready {
            self.mark_started(session_name).await;
            self.dispatch_registration_prompt_async(session_name.clone(), role.to_string(), member_id, runtime_type);
            return Ok("Agent registered successfully after cleanup and reinit".to_string());
        }

        // Step 2 — full recreation, only if enough of the budget remains.
        if deadline.saturating_duration_since(Instant::now()) < config::step2_min_remaining() {
            return Err(escalation_exhausted(start));
        }

        let _ = self.backend.kill_session(session_name).await;
        tokio::time::sleep(config::step2_kill_wait()).await;
        self.backend
            .create_session(session_name, &create_cwd, &[])
            .await?;

        let adapter2 = adapter_for(runtime_type);
        let _ = adapter2
            .execute_runtime_init_script(self.backend.as_ref(), session_name, &create_cwd)
            .await;
        let ready_budget = if role == ORCHESTRATOR_ROLE {
            config::step2_ready_budget_orchestrator()
        } else {
            config::step2_ready_budget_other()
        };
        let ready2 = adapter2
            .wait_for_runtime_ready(self.backend.as_ref(), session_name, ready_budget, config::poll_interval())
            .await;
        if !ready2 {
            return Err(escalation_exhausted(start));
        }

        if role == ORCHESTRATOR_ROLE {
            tokio::time::sleep(config::step2_orchestrator_verify_wait()).await;
            let adapter3 = adapter_for(runtime_type);
            let verified = adapter3
                .detect_runtime_with_command(self.backend.as_ref(), session_name, true)
                .await
                .unwrap_or(false);
            if !verified {
                return Err(escalation_exhausted(start));
            }
        }

        self.mark_started(session_name).await;
        self.dispatch_registration_prompt_async(session_name.clone(), role.to_string(), member_id, runtime_type);
        Ok("Agent registered successfully after full recreation".to_string())
    }

    /// Create the session if missing; otherwise attempt recovery before
    /// recreating from scratch.
    pub async fn create_agent_session(&self, params: CreateAgentSessionParams) -> Result<String, SupervisorError> {
        let CreateAgentSessionParams {
            session_name,
            role,
            cwd,
            member_id,
            runtime_type,
        } = params;
        let runtime_type = match runtime_type {
            Some(rt) => rt,
            None => self.resolve_runtime_type(&session_name, &role).await,
        };

        if self.backend.session_exists(&session_name) {
            return self
                .recover_existing_session(&session_name, &role, cwd.as_deref(), member_id, runtime_type)
                .await;
        }

        let create_cwd = self.session_cwd(&role, cwd.as_deref());
        self.backend.create_session(&session_name, &create_cwd, &[]).await?;
        self.inject_session_environment(&session_name, &role).await;

        self.initialize_agent_with_registration(
            &session_name,
            &role,
            Some(&create_cwd),
            config::default_total_timeout(),
            member_id,
            runtime_type,
        )
        .await
    }

    async fn inject_session_environment(&self, session_name: &SessionName, role: &str) {
        if let Some(session) = self.backend.get_session(session_name) {
            let _ = command::set_environment_variable(session.as_ref(), "TMUX_SESSION_NAME", session_name.as_str()).await;
            let _ = command::set_environment_variable(session.as_ref(), "AGENTMUX_ROLE", role).await;
        }
    }

    async fn recover_existing_session(
        &self,
        session_name: &SessionName,
        role: &str,
        cwd: Option<&Path>,
        member_id: Option<TeamMemberId>,
        runtime_type: RuntimeType,
    ) -> Result<String, SupervisorError> {
        let adapter = adapter_for(runtime_type);

        // (a) Probe, and if detected try one verification pass.
        let detected = adapter
            .detect_runtime_with_command(self.backend.as_ref(), session_name, false)
            .await
            .unwrap_or(false);
        if detected {
            if let Ok(msg) = self
                .recovery_verify_and_register(session_name, role, member_id.clone(), runtime_type)
                .await
            {
                return Ok(msg);
            }
        }

        // (b) Two Ctrl+C, clear cache, probe once more.
        if let Some(session) = self.backend.get_session(session_name) {
            let _ = command::send_ctrl_c(session.as_ref()).await;
            tokio::time::sleep(config::recovery_ctrl_c_pause()).await;
            let _ = command::send_ctrl_c(session.as_ref()).await;
        }
        adapter.clear_detection_cache(session_name);
        let detected2 = adapter
            .detect_runtime_with_command(self.backend.as_ref(), session_name, true)
            .await
            .unwrap_or(false);
        if detected2 {
            if let Ok(msg) = self
                .recovery_verify_and_register(session_name, role, member_id.clone(), runtime_type)
                .await
            {
                return Ok(msg);
            }
        }

        // (c) Kill and fall through to fresh creation.
        self.backend.kill_session(session_name).await?;
        tokio::time::sleep(config::recovery_kill_wait()).await;

        let create_cwd = self.session_cwd(role, cwd);
        self.backend.create_session(session_name, &create_cwd, &[]).await?;
        self.inject_session_environment(session_name, role).await;

        self.initialize_agent_with_registration(
            session_name,
            role,
            Some(&create_cwd),
            config::default_total_timeout(),
            member_id,
            runtime_type,
        )
        .await
    }

    async fn recovery_verify_and_register(
        &self,
        session_name: &SessionName,
        role: &str,
        member_id: Option<TeamMemberId>,
        runtime_type: RuntimeType,
    ) -> Result<String, SupervisorError> {
        let adapter = adapter_for(runtime_type);
        let ready = adapter
            .wait_for_runtime_ready(
                self.backend.as_ref(),
                session_name,
                config::recovery_verify_budget(),
                config::poll_interval(),
            )
            .await;
        if !ready {
            return Err(SupervisorError::RuntimeNotReady);
        }
        self.mark_started(session_name).await;
        self.dispatch_registration_prompt_async(session_name.clone(), role.to_string(), member_id, runtime_type);
        Ok("Agent registered successfully after recovery verification".to_string())
    }

    /// Idempotent: killing an already-gone session is not an error.
    pub async fn terminate_agent_session(&self, session_name: &SessionName) -> Result<(), SupervisorError> {
        self.backend.kill_session(session_name).await?;
        self.storage.update_agent_status(session_name.as_str(), AgentStatus::Inactive).await;
        Ok(())
    }

    /// Thin adapter over the Delivery Engine.
    pub async fn send_message_to_agent(
        &self,
        session_name: &SessionName,
        text: &str,
        runtime_type: Option<RuntimeType>,
    ) -> Result<(), SupervisorError> {
        let runtime_type = match runtime_type {
            Some(rt) => rt,
            None => self.resolve_runtime_type(session_name, "").await,
        };
        let patterns = patterns_for(runtime_type);
        agentmux_delivery::send_message_with_retry(self.backend.as_ref(), &patterns, session_name, text, runtime_type)
            .await
            .map_err(SupervisorError::Delivery)
    }

    /// Thin adapter over the Session Command Helper.
    pub async fn send_key_to_agent(&self, session_name: &SessionName, key: &[u8]) -> Result<(), SupervisorError> {
        let session = self
            .backend
            .get_session(session_name)
            .ok_or_else(|| SupervisorError::SessionNotFound(session_name.to_string()))?;
        command::send_key(session.as_ref(), key).await?;
        Ok(())
    }

    /// Thin health check: does the PTY session still exist, polled up to
    /// `timeout` in case creation is racing in from another task.
    pub async fn check_agent_health(&self, session_name: &SessionName, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.backend.session_exists(session_name) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

fn step1_budget_within(deadline: Instant) -> Duration {
    config::step1_ready_budget().min(deadline.saturating_duration_since(Instant::now()))
}

fn escalation_exhausted(start: Instant) -> SupervisorError {
    let elapsed = start.elapsed().as_secs();
    SupervisorError::EscalationExhausted(format!(
        "Failed to initialize agent after optimized escalation attempts ({elapsed}s)"
    ))
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
