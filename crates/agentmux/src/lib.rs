// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentmux: wires the Runtime Adapter, PTY Session Backend, Delivery
//! Engine, Lifecycle Supervisor, and Heartbeat Store into one
//! `Orchestrator` facade, plus home-directory resolution and tracing setup.

mod config;
mod error;
mod logging;
mod orchestrator;

pub use config::{home_dir, status_file_path};
pub use error::AgentMuxError;
pub use logging::init_tracing;
pub use orchestrator::Orchestrator;

// Re-export the layer crates so a consumer only needs this one dependency.
pub use agentmux_core as core;
pub use agentmux_delivery as delivery;
pub use agentmux_heartbeat as heartbeat;
pub use agentmux_pty as pty;
pub use agentmux_runtime as runtime;
pub use agentmux_supervisor as supervisor;
