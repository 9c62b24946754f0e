// SPDX-License-Identifier: MIT

//! Tracing initialization. Unlike a long-running daemon, this subsystem is
//! usually embedded inside a host process, so there is no log rotation or
//! file appender here — just an `EnvFilter`-driven subscriber on stderr,
//! installed at most once per process.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a global `tracing` subscriber reading `RUST_LOG` (default
/// `info`). Safe to call more than once; only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
