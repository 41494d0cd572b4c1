use serde::{Deserialize, Serialize};
use tourguide_core::{Catalog, ItineraryPlan, PlaceFacts};

use crate::intent::Intent;

pub const MAX_SUGGESTIONS: usize = 4;
pub const SAMPLE_PLACE_COUNT: usize = 12;

pub const INPUT_BLOCKED_TEXT: &str = "❌ Safety Agent blocked your input.";
pub const OUTPUT_BLOCKED_TEXT: &str = "⚠️ Output blocked by Safety Agent.";

const EXAMPLE_FACTS: &str = "Tell me about Sigiriya";
const EXAMPLE_PLAN: &str = "Plan a 3-hour tour in Kandy";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<String>,
}

impl Reply {
    fn new<I, S>(text: impl Into<String>, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let suggestions =
            suggestions.into_iter().map(Into::into).take(MAX_SUGGESTIONS).collect::<Vec<_>>();
        Self { text: text.into(), suggestions }
    }
}

/// What a turn resolved to, before any wording is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Welcome { intent: Intent },
    Chitchat,
    Facts(PlaceFacts),
    PlaceNotFound { query: String },
    Itinerary(ItineraryPlan),
    PlanFailed { city: String, minutes: u32 },
    PromptCity,
    PromptMinutes { city: String, confirming_city: bool },
    RepromptMinutes,
}

impl TurnOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::Chitchat => "chitchat",
            Self::Facts(_) => "facts",
            Self::PlaceNotFound { .. } => "place_not_found",
            Self::Itinerary(_) => "itinerary",
            Self::PlanFailed { .. } => "plan_failed",
            Self::PromptCity => "prompt_city",
            Self::PromptMinutes { .. } => "prompt_minutes",
            Self::RepromptMinutes => "reprompt_minutes",
        }
    }
}

/// Deterministic templates for every turn outcome.
#[derive(Clone, Debug, Default)]
pub struct ReplyComposer {
    sample_places: Vec<String>,
}

impl ReplyComposer {
    pub fn new(catalog: &Catalog) -> Self {
        let sample_places = catalog
            .list_places()
            .into_iter()
            .take(SAMPLE_PLACE_COUNT)
            .map(str::to_string)
            .collect::<Vec<_>>();
        Self { sample_places }
    }

    pub fn compose(&self, outcome: &TurnOutcome) -> Reply {
        match outcome {
            TurnOutcome::Welcome { intent } => Reply::new(self.welcome_text(), suggest_for(*intent, None)),
            TurnOutcome::Chitchat => Reply::new(
                "Hello! I'm glad you're here. I can share quick facts about places or plan a mini tour.\n\n\
                 Try: **Tell me about Sigiriya** or **Plan a 2-hour tour in Kandy**.",
                suggest_for(Intent::Chitchat, None),
            ),
            TurnOutcome::Facts(facts) => Reply::new(
                facts_text(facts),
                suggest_for(Intent::Facts, Some(facts.place.as_str())),
            ),
            TurnOutcome::PlaceNotFound { .. } => Reply::new(
                format!(
                    "I couldn't find that place. Try one of these: {} …",
                    self.sample_places.join(", ")
                ),
                [EXAMPLE_FACTS, "Tell me about Kandy", EXAMPLE_PLAN],
            ),
            TurnOutcome::Itinerary(plan) => Reply::new(
                itinerary_text(plan),
                suggest_for(Intent::Itinerary, Some(plan.city.as_str())),
            ),
            TurnOutcome::PlanFailed { .. } => Reply::new(
                "I couldn't plan that. Try **Plan a 3-hour tour in Kandy**.",
                [EXAMPLE_PLAN, "Help"],
            ),
            TurnOutcome::PromptCity => Reply::new(
                "Which **city** would you like a tour for?",
                ["Kandy", "Galle", "Ella", "Sigiriya"],
            ),
            TurnOutcome::PromptMinutes { city, confirming_city } => {
                let lead = if *confirming_city {
                    "Great. How much time do you have"
                } else {
                    "How much **time** do you have"
                };
                Reply::new(
                    format!("{lead} for **{city}**? (e.g., *2 hours* or *120 min*)"),
                    duration_suggestions(),
                )
            }
            TurnOutcome::RepromptMinutes => Reply::new(
                "Please tell me the time like **2 hours** or **150 min**.",
                duration_suggestions(),
            ),
        }
    }

    pub fn input_blocked(&self) -> Reply {
        Reply::new(INPUT_BLOCKED_TEXT, ["Help"])
    }

    pub fn output_blocked(&self) -> Reply {
        Reply::new(OUTPUT_BLOCKED_TEXT, ["Help", EXAMPLE_FACTS, EXAMPLE_PLAN])
    }

    fn welcome_text(&self) -> String {
        format!(
            "Hi! I am your Virtual Tour Guide.\n\
             Try: **{EXAMPLE_FACTS}** or **{EXAMPLE_PLAN}**.\n\
             Places in my dataset: {} …",
            self.sample_places.join(", ")
        )
    }
}

fn facts_text(facts: &PlaceFacts) -> String {
    let body = if facts.facts.is_empty() {
        "No facts.".to_string()
    } else {
        facts.facts.iter().map(|fact| format!("\n- {fact}")).collect::<String>()
    };
    format!(
        "**{place}**{body}\n\n**Ticket:** {ticket}\n\n\
         Would you like a 2–3 stop **mini tour** in **{place}**? Tell me your time (e.g., *2 hours*).",
        place = facts.place,
        ticket = facts.ticket,
    )
}

fn itinerary_text(plan: &ItineraryPlan) -> String {
    let lines = plan
        .stops
        .iter()
        .enumerate()
        .map(|(index, stop)| format!("{}. {} — ~{} min", index + 1, stop.name, stop.minutes))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "**{} — {}/{} min**\n{lines}\n\nWant **ticket info** or **quick facts** as well?",
        plan.city, plan.planned_minutes, plan.total_minutes
    )
}

fn duration_suggestions() -> [&'static str; 3] {
    ["1 hour", "2 hours", "3 hours"]
}

/// Follow-up chips keyed by intent and, where it matters, the place in focus.
pub fn suggest_for(intent: Intent, place: Option<&str>) -> Vec<String> {
    match (intent, place) {
        (Intent::Help | Intent::Unknown, _) => {
            vec![EXAMPLE_FACTS.to_string(), EXAMPLE_PLAN.to_string()]
        }
        (Intent::Facts, Some(place)) => vec![
            format!("Plan a 2-hour tour in {place}"),
            format!("Ticket price in {place}"),
            "Another city".to_string(),
        ],
        (Intent::Itinerary, Some(city)) => {
            vec![format!("Facts about {city}"), "Plan another city".to_string(), "Help".to_string()]
        }
        (Intent::Chitchat, _) => vec![
            EXAMPLE_FACTS.to_string(),
            "Plan a 2-hour tour".to_string(),
            "Help".to_string(),
        ],
        (Intent::Facts | Intent::Itinerary, None) => Vec::new(),
    }
}
