// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentmux-heartbeat: the Heartbeat & Agent-Status Store (L5) and its
//! Status Batcher (L6) — batched, atomically-persisted proof-of-life
//! records with stale-agent detection.

mod batcher;
mod error;
mod file_lock;
mod persist;
mod store;

pub use error::HeartbeatError;
pub use store::{default_stale_threshold, HeartbeatStore};

#[cfg(any(test, feature = "test-support"))]
pub use batcher::StatusBatcher;
#[cfg(any(test, feature = "test-support"))]
pub use file_lock::FileLockRegistry;

#[cfg(test)]
#[path = "batcher_proptests.rs"]
mod batcher_proptests;
