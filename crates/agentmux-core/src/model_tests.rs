use super::*;
use crate::id::TeamMemberId;
use chrono::TimeZone;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[test]
fn orchestrator_session_resolves_reserved_agent_id_regardless_of_member_id() {
    let member = TeamMemberId::new("member-42");
    let resolved = resolve_agent_id("orchestrator", Some(&member));
    assert_eq!(resolved, "orchestrator");
}

#[test]
fn non_orchestrator_session_prefers_team_member_id() {
    let member = TeamMemberId::new("member-42");
    let resolved = resolve_agent_id("dev-session", Some(&member));
    assert_eq!(resolved, "member-42");
}

#[test]
fn non_orchestrator_session_falls_back_to_session_name() {
    let resolved = resolve_agent_id("dev-session", None);
    assert_eq!(resolved, "dev-session");
}

#[test]
fn apply_update_upserts_orchestrator_in_place() {
    let mut file = TeamAgentStatusFile::default_at(ts(0));
    let update = BatchedStatusUpdate {
        agent_id: AgentId::new("orchestrator"),
        session_name: SessionName::new("orchestrator"),
        team_member_id: None,
        agent_status: AgentStatus::Active,
        timestamp: ts(10),
    };
    file.apply_update(&update, ts(11));
    assert_eq!(file.orchestrator.agent_status, AgentStatus::Active);
    assert_eq!(file.orchestrator.last_active_time, ts(10));
    assert_eq!(file.orchestrator.updated_at, ts(11));
}

#[test]
fn apply_update_creates_team_member_on_first_update() {
    let mut file = TeamAgentStatusFile::default_at(ts(0));
    let update = BatchedStatusUpdate {
        agent_id: AgentId::new("dev-1"),
        session_name: SessionName::new("dev-1"),
        team_member_id: None,
        agent_status: AgentStatus::Started,
        timestamp: ts(5),
    };
    file.apply_update(&update, ts(5));
    let hb = file.get("dev-1").expect("team member should exist");
    assert_eq!(hb.agent_status, AgentStatus::Started);
    assert_eq!(hb.created_at, ts(5));
}

#[test]
fn status_displays_match_wire_format_strings() {
    assert_eq!(AgentStatus::PotentialInactive.to_string(), "potentialInactive");
    assert_eq!(AgentStatus::Active.to_string(), "active");
}
