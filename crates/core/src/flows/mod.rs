pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, SlotFillingFlow};
pub use states::{
    ConversationState, DialogueAction, DialogueEvent, PendingSlot, SlotView, TransitionOutcome,
};
