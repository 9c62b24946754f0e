// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentmux-supervisor: the Lifecycle Supervisor — a two-step escalation
//! ladder that brings a session from "just spawned" to "runtime ready and
//! registered", plus the recovery path for sessions that already exist.

pub mod config;
mod error;
mod prompts;
mod supervisor;

pub use error::SupervisorError;
pub use supervisor::{CreateAgentSessionParams, Supervisor};
