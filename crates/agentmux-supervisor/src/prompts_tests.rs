use super::{render_prompt, PromptCache};

#[test]
fn render_substitutes_session_and_member_id() {
    let template = r#"{"sessionId": "{{SESSION_ID}}", "memberId": "{{MEMBER_ID}}"}"#;
    let rendered = render_prompt(template, "s1", Some("m1"));
    assert_eq!(rendered, r#"{"sessionId": "s1", "memberId": "m1"}"#);
}

#[test]
fn render_strips_member_id_fragment_when_absent() {
    let template = r#"{"sessionId": "{{SESSION_ID}}", "memberId": "{{MEMBER_ID}}"}"#;
    let rendered = render_prompt(template, "s1", None);
    assert_eq!(rendered, r#"{"sessionId": "s1"}"#);
}

#[test]
fn falls_back_to_compiled_template_when_file_missing() {
    let cache = PromptCache::new();
    let dir = tempfile::tempdir().unwrap();
    let text = cache.load(dir.path(), "developer", false);
    assert!(text.contains("developer"));
    assert!(text.contains("{{SESSION_ID}}"));
}

#[test]
fn loads_and_caches_file_when_present() {
    let cache = PromptCache::new();
    let dir = tempfile::tempdir().unwrap();
    let role_dir = dir.path().join("config").join("roles").join("developer");
    std::fs::create_dir_all(&role_dir).unwrap();
    std::fs::write(role_dir.join("prompt.md"), "custom prompt for {{SESSION_ID}}").unwrap();

    let text = cache.load(dir.path(), "developer", false);
    assert_eq!(text, "custom prompt for {{SESSION_ID}}");

    // Remove the file; cached value should still be served.
    std::fs::remove_file(role_dir.join("prompt.md")).unwrap();
    let text_again = cache.load(dir.path(), "developer", false);
    assert_eq!(text_again, "custom prompt for {{SESSION_ID}}");
}
