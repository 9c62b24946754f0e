// SPDX-License-Identifier: MIT

//! A controllable `RuntimeAdapter` for tests that exercise the supervisor
//! and delivery engine without real prompt-detection heuristics.

use crate::adapter::RuntimeAdapter;
use crate::error::RuntimeError;
use crate::patterns::{claude_code, RuntimePatterns};
use agentmux_core::model::RuntimeType;
use agentmux_core::SessionName;
use agentmux_pty::PtyBackend;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Default)]
struct State {
    ready_sessions: HashSet<SessionName>,
    detect_results: HashMap<SessionName, bool>,
    init_script_calls: Vec<SessionName>,
    cache_cleared: Vec<SessionName>,
}

/// Test double whose readiness/detection results are set directly by the
/// test, rather than being inferred from screen text.
pub struct FakeRuntimeAdapter {
    runtime_type: RuntimeType,
    patterns: RuntimePatterns,
    state: Mutex<State>,
}

impl FakeRuntimeAdapter {
    pub fn new(runtime_type: RuntimeType) -> Self {
        Self {
            runtime_type,
            patterns: claude_code::patterns(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn set_ready(&self, name: &SessionName, ready: bool) {
        let mut state = self.state.lock();
        if ready {
            state.ready_sessions.insert(name.clone());
        } else {
            state.ready_sessions.remove(name);
        }
    }

    pub fn set_detected(&self, name: &SessionName, detected: bool) {
        self.state.lock().detect_results.insert(name.clone(), detected);
    }

    pub fn init_script_calls(&self) -> Vec<SessionName> {
        self.state.lock().init_script_calls.clone()
    }

    pub fn cache_cleared_calls(&self) -> Vec<SessionName> {
        self.state.lock().cache_cleared.clone()
    }
}

#[async_trait]
impl RuntimeAdapter for FakeRuntimeAdapter {
    fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    fn patterns(&self) -> &RuntimePatterns {
        &self.patterns
    }

    async fn execute_runtime_init_script(
        &self,
        _backend: &dyn PtyBackend,
        name: &SessionName,
        _cwd: &std::path::Path,
    ) -> Result<(), RuntimeError> {
        self.state.lock().init_script_calls.push(name.clone());
        Ok(())
    }

    async fn detect_runtime_with_command(
        &self,
        _backend: &dyn PtyBackend,
        name: &SessionName,
        _force_refresh: bool,
    ) -> Result<bool, RuntimeError> {
        Ok(self.state.lock().detect_results.get(name).copied().unwrap_or(false))
    }

    async fn wait_for_runtime_ready(
        &self,
        _backend: &dyn PtyBackend,
        name: &SessionName,
        _timeout: Duration,
        _check_interval: Duration,
    ) -> bool {
        self.state.lock().ready_sessions.contains(name)
    }

    fn clear_detection_cache(&self, name: &SessionName) {
        self.state.lock().cache_cleared.push(name.clone());
    }
}
