// SPDX-License-Identifier: MIT

//! Per-runtime screen-state pattern constants: prompt recognition,
//! processing indicators, paste detection, and (for Gemini) shell-mode
//! detection.

use regex::Regex;
use std::sync::LazyLock;

/// The compiled pattern set a [`crate::adapter::RuntimeAdapter`] matches
/// screen/stream text against.
#[derive(Clone, Copy)]
pub struct RuntimePatterns {
    /// Strings whose presence on the final non-empty line means "at prompt".
    pub prompt_chars: &'static [&'static str],
    /// Regex over the raw output stream signalling the prompt has appeared.
    pub prompt_stream: &'static LazyLock<Regex>,
    /// Regexes for on-screen processing markers (spinner, "thinking", ...).
    pub processing_indicators: &'static LazyLock<Vec<Regex>>,
    /// Regex for a bracketed-paste marker.
    pub paste_indicator: &'static LazyLock<Regex>,
    /// Regex detecting an alternate shell-mode prompt, if the runtime has one.
    pub shell_mode: Option<&'static LazyLock<Regex>>,
    /// Regex detecting the runtime's command palette, used for probe-based
    /// detection.
    pub command_palette: &'static LazyLock<Regex>,
    /// Regex matching the runtime's welcome/ready banner.
    pub welcome_banner: &'static LazyLock<Regex>,
}

#[allow(clippy::expect_used)]
pub mod claude_code {
    use super::*;

    pub const PROMPT_CHARS: &[&str] = &["│ >", "> "];

    pub static PROMPT_STREAM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*\x{2502}?\s*>\s*$").expect("constant regex pattern is valid"));

    pub static PROCESSING_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"(?i)thinking").expect("constant regex pattern is valid"),
            Regex::new(r"(?i)analyzing").expect("constant regex pattern is valid"),
            Regex::new(r"[\x{2800}-\x{28ff}]").expect("constant regex pattern is valid"),
            Regex::new(r"(?i)esc to interrupt").expect("constant regex pattern is valid"),
        ]
    });

    pub static PASTE_INDICATOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[Pasted text").expect("constant regex pattern is valid"));

    pub static COMMAND_PALETTE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)slash commands|/help").expect("constant regex pattern is valid"));

    pub static WELCOME_BANNER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)welcome to claude code|Bypass Permissions mode")
            .expect("constant regex pattern is valid")
    });

    pub fn patterns() -> RuntimePatterns {
        RuntimePatterns {
            prompt_chars: PROMPT_CHARS,
            prompt_stream: &PROMPT_STREAM,
            processing_indicators: &PROCESSING_INDICATORS,
            paste_indicator: &PASTE_INDICATOR,
            shell_mode: None,
            command_palette: &COMMAND_PALETTE,
            welcome_banner: &WELCOME_BANNER,
        }
    }
}

#[allow(clippy::expect_used)]
pub mod gemini_cli {
    use super::*;

    pub const PROMPT_CHARS: &[&str] = &["│ >", "> "];

    pub static PROMPT_STREAM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*\x{2502}?\s*>\s*$").expect("constant regex pattern is valid"));

    pub static PROCESSING_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"(?i)generating").expect("constant regex pattern is valid"),
            Regex::new(r"(?i)thinking").expect("constant regex pattern is valid"),
            Regex::new(r"[\x{2800}-\x{28ff}]").expect("constant regex pattern is valid"),
        ]
    });

    pub static PASTE_INDICATOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[Pasted text").expect("constant regex pattern is valid"));

    /// Gemini's alternate `!` shell-mode prompt.
    pub static SHELL_MODE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x{2502}\s*!\s*\x{2502}").expect("constant regex pattern is valid"));

    pub static COMMAND_PALETTE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)slash commands|/help").expect("constant regex pattern is valid"));

    pub static WELCOME_BANNER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)welcome to gemini|select login method").expect("constant regex pattern is valid")
    });

    pub fn patterns() -> RuntimePatterns {
        RuntimePatterns {
            prompt_chars: PROMPT_CHARS,
            prompt_stream: &PROMPT_STREAM,
            processing_indicators: &PROCESSING_INDICATORS,
            paste_indicator: &PASTE_INDICATOR,
            shell_mode: Some(&SHELL_MODE),
            command_palette: &COMMAND_PALETTE,
            welcome_banner: &WELCOME_BANNER,
        }
    }
}

#[allow(clippy::expect_used)]
pub mod codex_cli {
    use super::*;

    pub const PROMPT_CHARS: &[&str] = &["›", "> "];

    pub static PROMPT_STREAM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*\x{203a}\s*$").expect("constant regex pattern is valid"));

    pub static PROCESSING_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"(?i)working").expect("constant regex pattern is valid"),
            Regex::new(r"(?i)thinking").expect("constant regex pattern is valid"),
            Regex::new(r"[\x{2800}-\x{28ff}]").expect("constant regex pattern is valid"),
        ]
    });

    pub static PASTE_INDICATOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[Pasted text").expect("constant regex pattern is valid"));

    pub static COMMAND_PALETTE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)slash commands|/help").expect("constant regex pattern is valid"));

    pub static WELCOME_BANNER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)welcome to codex").expect("constant regex pattern is valid"));

    pub fn patterns() -> RuntimePatterns {
        RuntimePatterns {
            prompt_chars: PROMPT_CHARS,
            prompt_stream: &PROMPT_STREAM,
            processing_indicators: &PROCESSING_INDICATORS,
            paste_indicator: &PASTE_INDICATOR,
            shell_mode: None,
            command_palette: &COMMAND_PALETTE,
            welcome_banner: &WELCOME_BANNER,
        }
    }
}

/// The last non-empty line of `text`, or `""` if every line is blank.
pub fn last_non_empty_line(text: &str) -> &str {
    text.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("")
}

/// True if any of `chars` occurs in `line`.
pub fn line_matches_prompt_chars(line: &str, chars: &[&str]) -> bool {
    chars.iter().any(|c| line.contains(c))
}
