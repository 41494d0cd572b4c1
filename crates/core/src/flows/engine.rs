use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::flows::states::{ConversationState, DialogueAction, DialogueEvent, TransitionOutcome};

pub trait FlowDefinition {
    fn initial_state(&self) -> ConversationState;
    fn transition(
        &self,
        current: &ConversationState,
        event: &DialogueEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Collects `{city, minutes}` for an itinerary request across turns.
#[derive(Clone, Debug, Default)]
pub struct SlotFillingFlow;

impl FlowDefinition for SlotFillingFlow {
    fn initial_state(&self) -> ConversationState {
        ConversationState::Idle
    }

    fn transition(
        &self,
        current: &ConversationState,
        event: &DialogueEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_slot_filling(current, event)
    }
}

#[derive(Clone, Debug)]
pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> ConversationState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &ConversationState,
        event: &DialogueEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &ConversationState,
        event: &DialogueEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_applied",
                        AuditCategory::Flow,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_rejected",
                        AuditCategory::Flow,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<SlotFillingFlow> {
    fn default() -> Self {
        Self::new(SlotFillingFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: ConversationState, event: DialogueEvent },
}

fn transition_slot_filling(
    current: &ConversationState,
    event: &DialogueEvent,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use ConversationState::{AwaitingCity, AwaitingMinutes, Idle};
    use DialogueAction::{PackItinerary, PromptForCity, PromptForMinutes, RepromptForMinutes};
    use DialogueEvent::{
        Abandoned, CityProvided, ItineraryRequested, MinutesProvided, MinutesUnparsed,
    };

    let (to, actions) = match (current, event) {
        (Idle, ItineraryRequested { city, minutes }) => {
            let city = city.as_deref().map(str::trim).filter(|city| !city.is_empty());
            match (city, minutes) {
                (None, _) => (AwaitingCity, vec![PromptForCity]),
                (Some(city), None) => (
                    AwaitingMinutes { city: city.to_string() },
                    vec![PromptForMinutes { city: city.to_string() }],
                ),
                (Some(city), Some(minutes)) => {
                    (Idle, vec![PackItinerary { city: city.to_string(), minutes: *minutes }])
                }
            }
        }
        (AwaitingCity, CityProvided { city }) if city.trim().is_empty() => {
            (AwaitingCity, vec![PromptForCity])
        }
        (AwaitingCity, CityProvided { city }) => (
            AwaitingMinutes { city: city.clone() },
            vec![PromptForMinutes { city: city.clone() }],
        ),
        (AwaitingMinutes { city }, MinutesProvided { minutes }) => {
            (Idle, vec![PackItinerary { city: city.clone(), minutes: *minutes }])
        }
        (AwaitingMinutes { .. }, MinutesUnparsed) => (current.clone(), vec![RepromptForMinutes]),
        (_, Abandoned) => (Idle, Vec::new()),
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: current.clone(),
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: current.clone(), to, event: event.clone(), actions })
}
