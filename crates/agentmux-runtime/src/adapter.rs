// SPDX-License-Identifier: MIT

//! The per-runtime adapter: starting a runtime, detecting it, and waiting
//! for it to become ready, with a short-lived per-session detection cache
//! to avoid probe storms.

use crate::error::RuntimeError;
use crate::patterns::{last_non_empty_line, line_matches_prompt_chars, RuntimePatterns};
use agentmux_core::{model::RuntimeType, SessionName};
use agentmux_pty::{command, PtyBackend};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

fn detection_cache_ttl() -> Duration {
    std::env::var("AGENTMUX_DETECTION_CACHE_TTL_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_secs(3))
}

struct CacheEntry {
    detected: bool,
    at: Instant,
}

/// Per-runtime behavior: starting it, probing it, and recognizing its
/// screen states. A fresh instance should be constructed per logically
/// distinct detection phase, since the detection cache is instance-scoped.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    fn runtime_type(&self) -> RuntimeType;
    fn patterns(&self) -> &RuntimePatterns;

    /// Write the canonical start command for this runtime into the session.
    async fn execute_runtime_init_script(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        cwd: &Path,
    ) -> Result<(), RuntimeError>;

    /// Probe the TUI for this runtime's command palette, caching the
    /// result briefly unless `force_refresh` is set.
    async fn detect_runtime_with_command(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        force_refresh: bool,
    ) -> Result<bool, RuntimeError>;

    /// Poll screen snapshots until the runtime's welcome/prompt marker
    /// appears or `timeout` elapses.
    async fn wait_for_runtime_ready(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        timeout: Duration,
        check_interval: Duration,
    ) -> bool;

    fn clear_detection_cache(&self, name: &SessionName);
}

/// Shared implementation parameterized by a runtime's start command and
/// pattern set. `ClaudeCodeAdapter`, `GeminiCliAdapter`, and `CodexCliAdapter`
/// are thin constructors over this.
pub struct GenericRuntimeAdapter {
    runtime_type: RuntimeType,
    start_command: &'static str,
    patterns: RuntimePatterns,
    cache: Mutex<HashMap<SessionName, CacheEntry>>,
}

impl GenericRuntimeAdapter {
    fn new(runtime_type: RuntimeType, start_command: &'static str, patterns: RuntimePatterns) -> Self {
        Self {
            runtime_type,
            start_command,
            patterns,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RuntimeAdapter for GenericRuntimeAdapter {
    fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    fn patterns(&self) -> &RuntimePatterns {
        &self.patterns
    }

    async fn execute_runtime_init_script(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        _cwd: &Path,
    ) -> Result<(), RuntimeError> {
        let session = backend
            .get_session(name)
            .ok_or_else(|| RuntimeError::Session(agentmux_pty::SessionError::NotFound(name.to_string())))?;
        command::send_message(session.as_ref(), self.start_command).await?;
        Ok(())
    }

    async fn detect_runtime_with_command(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        force_refresh: bool,
    ) -> Result<bool, RuntimeError> {
        if !force_refresh {
            if let Some(entry) = self.cache.lock().get(name) {
                if entry.at.elapsed() < detection_cache_ttl() {
                    return Ok(entry.detected);
                }
            }
        }

        let session = backend
            .get_session(name)
            .ok_or_else(|| RuntimeError::Session(agentmux_pty::SessionError::NotFound(name.to_string())))?;

        command::send_key(session.as_ref(), b"/").await?;
        tokio::time::sleep(Duration::from_millis(150)).await;
        let snapshot = command::capture_pane(session.as_ref(), 20);
        let detected = self.patterns.command_palette.is_match(&snapshot);
        command::send_escape(session.as_ref()).await?;

        self.cache.lock().insert(
            name.clone(),
            CacheEntry {
                detected,
                at: Instant::now(),
            },
        );
        debug!(session = %name, runtime = %self.runtime_type, detected, "runtime detection probe");
        Ok(detected)
    }

    async fn wait_for_runtime_ready(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        timeout: Duration,
        check_interval: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(session) = backend.get_session(name) {
                let snapshot = command::capture_pane(session.as_ref(), 30);
                let last_line = last_non_empty_line(&snapshot);
                if line_matches_prompt_chars(last_line, self.patterns.prompt_chars)
                    || self.patterns.welcome_banner.is_match(&snapshot)
                {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(check_interval).await;
        }
    }

    fn clear_detection_cache(&self, name: &SessionName) {
        self.cache.lock().remove(name);
    }
}

pub struct ClaudeCodeAdapter(GenericRuntimeAdapter);

impl ClaudeCodeAdapter {
    pub fn new() -> Self {
        Self(GenericRuntimeAdapter::new(
            RuntimeType::ClaudeCode,
            "claude",
            crate::patterns::claude_code::patterns(),
        ))
    }
}

impl Default for ClaudeCodeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeAdapter for ClaudeCodeAdapter {
    fn runtime_type(&self) -> RuntimeType {
        self.0.runtime_type()
    }
    fn patterns(&self) -> &RuntimePatterns {
        self.0.patterns()
    }
    async fn execute_runtime_init_script(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        cwd: &Path,
    ) -> Result<(), RuntimeError> {
        self.0.execute_runtime_init_script(backend, name, cwd).await
    }
    async fn detect_runtime_with_command(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        force_refresh: bool,
    ) -> Result<bool, RuntimeError> {
        self.0.detect_runtime_with_command(backend, name, force_refresh).await
    }
    async fn wait_for_runtime_ready(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        timeout: Duration,
        check_interval: Duration,
    ) -> bool {
        self.0.wait_for_runtime_ready(backend, name, timeout, check_interval).await
    }
    fn clear_detection_cache(&self, name: &SessionName) {
        self.0.clear_detection_cache(name)
    }
}

pub struct GeminiCliAdapter(GenericRuntimeAdapter);

impl GeminiCliAdapter {
    pub fn new() -> Self {
        Self(GenericRuntimeAdapter::new(
            RuntimeType::GeminiCli,
            "gemini",
            crate::patterns::gemini_cli::patterns(),
        ))
    }
}

impl Default for GeminiCliAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeAdapter for GeminiCliAdapter {
    fn runtime_type(&self) -> RuntimeType {
        self.0.runtime_type()
    }
    fn patterns(&self) -> &RuntimePatterns {
        self.0.patterns()
    }
    async fn execute_runtime_init_script(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        cwd: &Path,
    ) -> Result<(), RuntimeError> {
        self.0.execute_runtime_init_script(backend, name, cwd).await
    }
    async fn detect_runtime_with_command(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        force_refresh: bool,
    ) -> Result<bool, RuntimeError> {
        self.0.detect_runtime_with_command(backend, name, force_refresh).await
    }
    async fn wait_for_runtime_ready(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        timeout: Duration,
        check_interval: Duration,
    ) -> bool {
        self.0.wait_for_runtime_ready(backend, name, timeout, check_interval).await
    }
    fn clear_detection_cache(&self, name: &SessionName) {
        self.0.clear_detection_cache(name)
    }
}

pub struct CodexCliAdapter(GenericRuntimeAdapter);

impl CodexCliAdapter {
    pub fn new() -> Self {
        Self(GenericRuntimeAdapter::new(
            RuntimeType::CodexCli,
            "codex",
            crate::patterns::codex_cli::patterns(),
        ))
    }
}

impl Default for CodexCliAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeAdapter for CodexCliAdapter {
    fn runtime_type(&self) -> RuntimeType {
        self.0.runtime_type()
    }
    fn patterns(&self) -> &RuntimePatterns {
        self.0.patterns()
    }
    async fn execute_runtime_init_script(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        cwd: &Path,
    ) -> Result<(), RuntimeError> {
        self.0.execute_runtime_init_script(backend, name, cwd).await
    }
    async fn detect_runtime_with_command(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        force_refresh: bool,
    ) -> Result<bool, RuntimeError> {
        self.0.detect_runtime_with_command(backend, name, force_refresh).await
    }
    async fn wait_for_runtime_ready(
        &self,
        backend: &dyn PtyBackend,
        name: &SessionName,
        timeout: Duration,
        check_interval: Duration,
    ) -> bool {
        self.0.wait_for_runtime_ready(backend, name, timeout, check_interval).await
    }
    fn clear_detection_cache(&self, name: &SessionName) {
        self.0.clear_detection_cache(name)
    }
}

/// Construct the adapter for a given runtime type.
pub fn adapter_for(runtime_type: RuntimeType) -> Box<dyn RuntimeAdapter> {
    match runtime_type {
        RuntimeType::ClaudeCode => Box::new(ClaudeCodeAdapter::new()),
        RuntimeType::GeminiCli => Box::new(GeminiCliAdapter::new()),
        RuntimeType::CodexCli => Box::new(CodexCliAdapter::new()),
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
