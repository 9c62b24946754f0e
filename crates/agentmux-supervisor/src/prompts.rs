// SPDX-License-Identifier: MIT

//! Registration prompt loading, placeholder substitution, and the
//! in-memory template cache keyed by `(role, hasMemberId)`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

const FALLBACK_PROMPT: &str = r#"You are the "{{ROLE}}" agent for session {{SESSION_ID}}. \
Register yourself with the orchestrator now by calling the registration tool \
with {"sessionId": "{{SESSION_ID}}", "memberId": "{{MEMBER_ID}}"}."#;

/// Lazily-populated, never-invalidated cache mapping `(role, hasMemberId)`
/// to the loaded template text.
#[derive(Default)]
pub struct PromptCache {
    inner: Mutex<HashMap<(String, bool), String>>,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the prompt template for `role`, reading
    /// `<project_root>/config/roles/<role>/prompt.md` on first use and
    /// falling back to the compiled default when the file is unreadable.
    pub fn load(&self, project_root: &Path, role: &str, has_member_id: bool) -> String {
        let key = (role.to_string(), has_member_id);
        if let Some(cached) = self.inner.lock().get(&key) {
            return cached.clone();
        }

        let path = project_root.join("config").join("roles").join(role).join("prompt.md");
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| FALLBACK_PROMPT.replace("{{ROLE}}", role));

        self.inner.lock().insert(key, text.clone());
        text
    }
}

/// Substitute `{{SESSION_ID}}` / `{{MEMBER_ID}}` placeholders. When
/// `member_id` is absent, the `"memberId": "{{MEMBER_ID}}"` JSON fragment
/// (with its leading comma-space) is stripped entirely rather than left
/// with an unresolved placeholder.
pub fn render_prompt(template: &str, session_id: &str, member_id: Option<&str>) -> String {
    let mut rendered = template.replace("{{SESSION_ID}}", session_id);
    match member_id {
        Some(id) => rendered = rendered.replace("{{MEMBER_ID}}", id),
        None => {
            rendered = rendered.replace(r#", "memberId": "{{MEMBER_ID}}""#, "");
        }
    }
    rendered
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
