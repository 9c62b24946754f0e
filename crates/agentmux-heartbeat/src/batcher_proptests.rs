use crate::persist::load_status_file;
use crate::store::HeartbeatStore;
use agentmux_core::model::AgentStatus;
use agentmux_core::{FakeClock, SessionName};
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    /// After any interleaving of updates for one agent, the persisted
    /// record equals the last update applied, and `lastActiveTime` never
    /// regresses across flushes.
    #[test]
    fn batch_coalescing_keeps_only_the_latest_update(deltas_secs in prop::collection::vec(0u64..120, 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("rt");
        rt.block_on(async move {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("status.json");
            let clock = FakeClock::new();
            let store = HeartbeatStore::with_clock(&path, clock.clone());
            let session = SessionName::new("agent-x");

            let mut last_seen = clock.utc_now();
            for delta in &deltas_secs {
                clock.advance(Duration::from_secs(*delta));
                last_seen = clock.utc_now();
                store.update_agent_heartbeat(&session, None, AgentStatus::Active).await;
            }
            store.flush().await;

            let hb = store.get_agent_heartbeat("agent-x").expect("present");
            prop_assert_eq!(hb.last_active_time, last_seen);
        });
    }

    /// Across any sequence of flushes, a single agent's `lastActiveTime`
    /// is non-decreasing.
    #[test]
    fn heartbeat_monotonicity_holds_across_flushes(deltas_secs in prop::collection::vec(0u64..60, 1..20)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("rt");
        rt.block_on(async move {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("status.json");
            let clock = FakeClock::new();
            let session = SessionName::new("agent-mono");

            let mut previous = None;
            for delta in &deltas_secs {
                clock.advance(Duration::from_secs(*delta));
                let store = HeartbeatStore::with_clock(&path, clock.clone());
                store.update_agent_heartbeat(&session, None, AgentStatus::Active).await;
                store.flush().await;

                let now = clock.utc_now();
                let file = load_status_file(&path, now).expect("load");
                let hb = file.get("agent-mono").expect("present");
                if let Some(prev) = previous {
                    prop_assert!(hb.last_active_time >= prev);
                }
                previous = Some(hb.last_active_time);
            }
        });
    }
}
