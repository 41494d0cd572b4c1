use std::sync::OnceLock;

use regex::Regex;

/// Sanitized input is truncated to this many characters.
pub const MAX_INPUT_CHARS: usize = 2000;

pub const BANNED_SUBSTRINGS: &[&str] = &[
    "kill",
    "harm",
    "bomb",
    "terror",
    "suicide",
    "hack",
    "ddos",
    "phish",
    "malware",
    "ransomware",
    "password dump",
    "credit card",
    "steal",
    "meth",
    "cocaine",
    "rm -rf",
    "drop table",
    "union select",
    "exec(",
    "system(",
    "xp_cmdshell",
    "<script",
    "</script",
];

const SCRIPT_MARKERS: &[&str] = &["<script", "</script"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Block { reason_code: &'static str, detail: String },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

pub trait SafetyGate: Send + Sync {
    fn check_input(&self, text: &str) -> GateDecision;
    fn check_output(&self, text: &str) -> GateDecision;
}

/// Substring and tag based content filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSafetyGate {
    pub enabled: bool,
}

impl Default for PatternSafetyGate {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PatternSafetyGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SafetyGate for PatternSafetyGate {
    fn check_input(&self, text: &str) -> GateDecision {
        if !self.enabled {
            return GateDecision::Allow;
        }

        let lowered = text.to_lowercase();
        if let Some(term) = BANNED_SUBSTRINGS.iter().find(|term| lowered.contains(*term)) {
            return GateDecision::Block { reason_code: "banned_term", detail: (*term).to_string() };
        }

        // "<3" and stray brackets are fine, a tag-shaped run is not
        if (text.contains('<') || text.contains('>'))
            && html_tag_pattern().map(|pattern| pattern.is_match(text)).unwrap_or(true)
        {
            return GateDecision::Block {
                reason_code: "raw_html_tag",
                detail: "raw_html_tag".to_string(),
            };
        }

        GateDecision::Allow
    }

    fn check_output(&self, text: &str) -> GateDecision {
        if !self.enabled {
            return GateDecision::Allow;
        }

        let lowered = text.to_lowercase();
        match SCRIPT_MARKERS.iter().find(|marker| lowered.contains(*marker)) {
            Some(marker) => {
                GateDecision::Block { reason_code: "script", detail: (*marker).to_string() }
            }
            None => GateDecision::Allow,
        }
    }
}

/// Strips angle brackets, collapses whitespace, trims and caps the length.
pub fn sanitize(text: &str) -> String {
    let stripped = text.replace(['<', '>'], "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ").chars().take(MAX_INPUT_CHARS).collect()
}

fn html_tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<\s*/?\s*[a-z][a-z0-9\-]*\s*[^>]*>").ok()).as_ref()
}
