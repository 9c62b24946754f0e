// SPDX-License-Identifier: MIT

//! Process-wide [`PtyBackend`] singleton. The backend owns OS resources
//! (PTY file descriptors, child processes) that only make sense as a single
//! instance per process; callers reach it through `global()` rather than
//! threading an `Arc` through every layer.

use crate::backend::PtyBackend;
use crate::portable::PortablePtyBackend;
use once_cell::sync::OnceCell;
use std::sync::Arc;

static BACKEND: OnceCell<Arc<dyn PtyBackend>> = OnceCell::new();

/// Install the process-wide backend. Intended to be called once at
/// startup; a later call is a no-op and returns the backend that actually
/// won the race.
pub fn init() -> Arc<dyn PtyBackend> {
    BACKEND
        .get_or_init(|| Arc::new(PortablePtyBackend::new()) as Arc<dyn PtyBackend>)
        .clone()
}

/// Install an arbitrary backend (e.g. a fake) as the process-wide
/// singleton. Only takes effect if no backend has been installed yet.
pub fn init_with(backend: Arc<dyn PtyBackend>) -> Arc<dyn PtyBackend> {
    BACKEND.get_or_init(|| backend).clone()
}

/// Access the process-wide backend, initializing the default
/// [`PortablePtyBackend`] on first use.
pub fn global() -> Arc<dyn PtyBackend> {
    init()
}
