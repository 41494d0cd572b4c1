use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const HELP_TRIGGERS: &[&str] = &["help", "how to use", "what can you do"];

pub const ITINERARY_TRIGGERS: &[&str] = &[
    "plan",
    "route",
    "itinerary",
    "tour",
    "make a plan",
    "schedule",
    "visit plan",
    "trip plan",
    "route plan",
];

pub const FACTS_TRIGGERS: &[&str] = &[
    "tell me about",
    "facts",
    "history",
    "info about",
    "information about",
    "what is",
    "where is",
    "ticket",
    "opening",
    "close time",
];

pub const CHITCHAT_TRIGGERS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good evening",
    "good night",
    "how are you",
    "what's up",
    "whats up",
    "good afternoon",
    "greetings",
];

/// Hour durations below this are raised to it.
pub const MIN_HOUR_MINUTES: u32 = 30;
/// Minute durations below this are raised to it.
pub const MIN_MINUTE_MINUTES: u32 = 15;

const MAX_BARE_WORDS: usize = 3;
const PLACE_TRIM: &[char] = &[' ', '?', '!', '.'];

// Words that carry the request rather than the destination.
const REQUEST_WORDS: &[&str] = &[
    "a", "an", "the", "about", "me", "my", "of", "please", "plan", "route", "itinerary", "tour",
    "schedule", "trip", "visit", "make", "h", "hr", "hrs", "hour", "hours", "m", "min", "mins",
    "minute", "minutes",
];

const CITY_STOP_WORDS: &[&str] = &["in", "at", "around", "for", "with", "within"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Help,
    Itinerary,
    Facts,
    Chitchat,
    Unknown,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Itinerary => "itinerary",
            Self::Facts => "facts",
            Self::Chitchat => "chitchat",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub payload: IntentPayload,
}

impl IntentResult {
    fn bare(intent: Intent) -> Self {
        Self { intent, payload: IntentPayload::default() }
    }
}

/// One row of the routing table. `matches` sees the trimmed, lowercased
/// utterance; `extract` sees the utterance as typed.
#[derive(Clone, Copy)]
pub struct IntentRule {
    pub name: &'static str,
    pub intent: Intent,
    matches: fn(&str) -> bool,
    extract: fn(&str) -> IntentPayload,
}

impl std::fmt::Debug for IntentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentRule").field("name", &self.name).field("intent", &self.intent).finish()
    }
}

/// Evaluated top to bottom, first match wins. Itinerary sits above facts so
/// that "plan about kandy" is a planning request.
static INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        name: "help_trigger",
        intent: Intent::Help,
        matches: has_help_trigger,
        extract: no_payload,
    },
    IntentRule {
        name: "itinerary_trigger",
        intent: Intent::Itinerary,
        matches: has_itinerary_trigger,
        extract: itinerary_payload,
    },
    IntentRule {
        name: "facts_trigger",
        intent: Intent::Facts,
        matches: has_facts_trigger,
        extract: facts_payload,
    },
    IntentRule {
        name: "chitchat_trigger",
        intent: Intent::Chitchat,
        matches: has_chitchat_trigger,
        extract: no_payload,
    },
    IntentRule {
        name: "bare_place_name",
        intent: Intent::Facts,
        matches: is_short_utterance,
        extract: bare_place_payload,
    },
];

#[derive(Clone, Copy, Debug, Default)]
pub struct IntentRouter;

impl IntentRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn rules(&self) -> &'static [IntentRule] {
        INTENT_RULES
    }

    pub fn classify(&self, text: &str) -> IntentResult {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return IntentResult::bare(Intent::Unknown);
        }

        match INTENT_RULES.iter().find(|rule| (rule.matches)(&lowered)) {
            Some(rule) => {
                tracing::debug!(
                    event_name = "intent.classified",
                    rule = rule.name,
                    intent = rule.intent.as_str(),
                    "utterance classified"
                );
                IntentResult { intent: rule.intent, payload: (rule.extract)(text) }
            }
            None => IntentResult::bare(Intent::Unknown),
        }
    }
}

/// First duration in the text, in minutes. Hours are rounded and floored at
/// [`MIN_HOUR_MINUTES`]; plain minutes are floored at [`MIN_MINUTE_MINUTES`].
pub fn parse_minutes(text: &str) -> Option<u32> {
    let captures = duration_pattern()?.captures(text)?;

    if let Some(hours) = captures.get(1) {
        let hours = hours.as_str().parse::<f64>().ok()?;
        let minutes = (hours * 60.0).round();
        // float-to-int `as` saturates
        return Some((minutes as u32).max(MIN_HOUR_MINUTES));
    }

    let minutes = captures.get(2)?.as_str();
    let minutes = minutes.parse::<u64>().map_or(u32::MAX, |value| {
        u32::try_from(value).unwrap_or(u32::MAX)
    });
    Some(minutes.max(MIN_MINUTE_MINUTES))
}

/// City named after a preposition ("in Kandy"), else the utterance itself when
/// it is no more than three words, with request words dropped.
pub fn extract_city(text: &str) -> Option<String> {
    let text = text.trim();

    if let Some(captures) = city_pattern().and_then(|pattern| pattern.captures(text)) {
        if let Some(city) = captures.get(1) {
            let city = cut_at_stop_word(city.as_str().trim_matches(PLACE_TRIM));
            if !city.is_empty() {
                return Some(title_case(&city));
            }
        }
    }

    let words = text
        .split(|character: char| !character.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>();
    if words.len() > MAX_BARE_WORDS {
        return None;
    }
    let place_words = words
        .into_iter()
        .filter(|word| !REQUEST_WORDS.contains(&word.to_ascii_lowercase().as_str()))
        .collect::<Vec<_>>();
    if place_words.is_empty() {
        return None;
    }
    Some(title_case(&place_words.join(" ")))
}

fn duration_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?i)(?:([0-9]+(?:\.[0-9]+)?)[\s-]*(?:hours?|hrs?|h))|(?:([0-9]+)[\s-]*(?:minutes?|mins?|m))",
            )
            .ok()
        })
        .as_ref()
}

fn city_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b(?:in|at|around|for)\s+([a-z][a-z\s\-']{1,40})\b").ok())
        .as_ref()
}

fn cut_at_stop_word(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .take_while(|word| !CITY_STOP_WORDS.contains(&word.to_ascii_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for character in text.chars() {
        if character.is_alphabetic() {
            if previous_is_letter {
                titled.extend(character.to_lowercase());
            } else {
                titled.extend(character.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            titled.push(character);
            previous_is_letter = false;
        }
    }
    titled
}

fn contains_any(lowered: &str, triggers: &[&str]) -> bool {
    triggers.iter().any(|trigger| lowered.contains(trigger))
}

fn has_help_trigger(lowered: &str) -> bool {
    contains_any(lowered, HELP_TRIGGERS)
}

fn has_itinerary_trigger(lowered: &str) -> bool {
    contains_any(lowered, ITINERARY_TRIGGERS)
}

fn has_facts_trigger(lowered: &str) -> bool {
    contains_any(lowered, FACTS_TRIGGERS)
}

fn has_chitchat_trigger(lowered: &str) -> bool {
    contains_any(lowered, CHITCHAT_TRIGGERS)
}

fn is_short_utterance(lowered: &str) -> bool {
    let words = lowered.split_whitespace().count();
    (1..=MAX_BARE_WORDS).contains(&words)
}

fn no_payload(_text: &str) -> IntentPayload {
    IntentPayload::default()
}

fn itinerary_payload(text: &str) -> IntentPayload {
    IntentPayload { place: None, city: extract_city(text), minutes: parse_minutes(text) }
}

fn facts_payload(text: &str) -> IntentPayload {
    let lowered = text.to_lowercase();
    let place = match lowered.split_once("about") {
        Some((_, after)) => after.trim_matches(PLACE_TRIM).to_string(),
        None => text.trim_matches(PLACE_TRIM).to_string(),
    };
    IntentPayload { place: Some(place), city: None, minutes: None }
}

fn bare_place_payload(text: &str) -> IntentPayload {
    IntentPayload { place: Some(text.trim_matches(PLACE_TRIM).to_string()), city: None, minutes: None }
}
