// SPDX-License-Identifier: MIT

//! Escalation-ladder timing budgets, overridable via environment variables
//! with compiled-in defaults matching the step budgets.

use std::time::Duration;

fn from_env_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

pub fn default_total_timeout() -> Duration {
    from_env_ms("AGENTMUX_SUPERVISOR_TOTAL_TIMEOUT_MS", Duration::from_secs(70))
}

pub fn step1_budget() -> Duration {
    from_env_ms("AGENTMUX_STEP1_BUDGET_MS", Duration::from_secs(40))
}

pub fn step1_ready_budget() -> Duration {
    from_env_ms("AGENTMUX_STEP1_READY_BUDGET_MS", Duration::from_secs(30))
}

pub fn poll_interval() -> Duration {
    from_env_ms("AGENTMUX_READY_POLL_INTERVAL_MS", Duration::from_millis(1500))
}

/// Step 2 only runs if at least this much of `totalTimeout` remains.
pub fn step2_min_remaining() -> Duration {
    from_env_ms("AGENTMUX_STEP2_MIN_REMAINING_MS", Duration::from_secs(35))
}

pub fn step2_budget() -> Duration {
    from_env_ms("AGENTMUX_STEP2_BUDGET_MS", Duration::from_secs(30))
}

pub fn step2_kill_wait() -> Duration {
    from_env_ms("AGENTMUX_STEP2_KILL_WAIT_MS", Duration::from_secs(1))
}

pub fn step2_ready_budget_orchestrator() -> Duration {
    from_env_ms("AGENTMUX_STEP2_READY_ORCHESTRATOR_MS", Duration::from_secs(45))
}

pub fn step2_ready_budget_other() -> Duration {
    from_env_ms("AGENTMUX_STEP2_READY_OTHER_MS", Duration::from_secs(25))
}

pub fn step2_orchestrator_verify_wait() -> Duration {
    from_env_ms("AGENTMUX_STEP2_ORCHESTRATOR_VERIFY_WAIT_MS", Duration::from_secs(5))
}

pub fn recovery_verify_budget() -> Duration {
    from_env_ms("AGENTMUX_RECOVERY_VERIFY_BUDGET_MS", Duration::from_secs(25))
}

pub fn recovery_ctrl_c_pause() -> Duration {
    from_env_ms("AGENTMUX_RECOVERY_CTRL_C_PAUSE_MS", Duration::from_millis(300))
}

pub fn recovery_kill_wait() -> Duration {
    from_env_ms("AGENTMUX_RECOVERY_KILL_WAIT_MS", Duration::from_secs(1))
}
