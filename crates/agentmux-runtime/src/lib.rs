// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentmux-runtime: per-coding-assistant-runtime behavior — starting a
//! runtime, detecting it, recognizing its prompt and processing indicators,
//! and its shell-mode escape oddities.

pub mod adapter;
pub mod error;
pub mod patterns;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use adapter::{adapter_for, ClaudeCodeAdapter, CodexCliAdapter, GeminiCliAdapter, RuntimeAdapter};
pub use error::RuntimeError;
pub use patterns::RuntimePatterns;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRuntimeAdapter;
