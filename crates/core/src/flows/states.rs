use serde::{Deserialize, Serialize};

/// Per-conversation slot-filling state. Each variant carries exactly the slots
/// that are valid for it, so a pending duration always has its city.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pending", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingCity,
    AwaitingMinutes { city: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingSlot {
    City,
    Minutes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub city: Option<String>,
    pub minutes: Option<u32>,
}

impl ConversationState {
    pub fn pending(&self) -> Option<PendingSlot> {
        match self {
            Self::Idle => None,
            Self::AwaitingCity => Some(PendingSlot::City),
            Self::AwaitingMinutes { .. } => Some(PendingSlot::Minutes),
        }
    }

    pub fn slots(&self) -> SlotView {
        match self {
            Self::AwaitingMinutes { city } => SlotView { city: Some(city.clone()), minutes: None },
            Self::Idle | Self::AwaitingCity => SlotView::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueEvent {
    ItineraryRequested { city: Option<String>, minutes: Option<u32> },
    CityProvided { city: String },
    MinutesProvided { minutes: u32 },
    MinutesUnparsed,
    Abandoned,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueAction {
    PromptForCity,
    PromptForMinutes { city: String },
    RepromptForMinutes,
    PackItinerary { city: String, minutes: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ConversationState,
    pub to: ConversationState,
    pub event: DialogueEvent,
    pub actions: Vec<DialogueAction>,
}
