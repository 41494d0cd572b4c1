use std::sync::Arc;

use tourguide_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use tourguide_core::flows::{
    ConversationState, DialogueAction, DialogueEvent, FlowEngine, SlotFillingFlow,
    TransitionOutcome,
};
use tourguide_core::{Catalog, ItineraryPacker, PlaceResolver};

use crate::composer::TurnOutcome;
use crate::intent::{parse_minutes, Intent, IntentResult, IntentRouter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnResult {
    pub outcome: TurnOutcome,
    pub state: ConversationState,
    /// Present when the turn went through the router rather than a pending slot.
    pub intent: Option<IntentResult>,
}

/// Owns the per-turn decision: fill a pending slot or classify afresh.
#[derive(Clone, Debug)]
pub struct DialogueManager {
    catalog: Arc<Catalog>,
    router: IntentRouter,
    flow: FlowEngine<SlotFillingFlow>,
}

impl DialogueManager {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog, router: IntentRouter::new(), flow: FlowEngine::default() }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn initial_state(&self) -> ConversationState {
        self.flow.initial_state()
    }

    /// Runs one sanitized utterance against `state`. Never fails: anything
    /// unresolvable becomes an outcome the composer can phrase.
    pub fn turn<S>(
        &self,
        text: &str,
        state: &ConversationState,
        sink: &S,
        audit: &AuditContext,
    ) -> TurnResult
    where
        S: AuditSink + ?Sized,
    {
        match state {
            ConversationState::AwaitingCity => {
                let event = DialogueEvent::CityProvided { city: text.to_string() };
                self.advance(state, event, None, sink, audit)
            }
            ConversationState::AwaitingMinutes { .. } => {
                let event = match parse_minutes(text) {
                    Some(minutes) => DialogueEvent::MinutesProvided { minutes },
                    None => DialogueEvent::MinutesUnparsed,
                };
                self.advance(state, event, None, sink, audit)
            }
            ConversationState::Idle => self.route(text, state, sink, audit),
        }
    }

    /// Drops any half-filled itinerary request.
    pub fn reset<S>(&self, state: &ConversationState, sink: &S, audit: &AuditContext) -> ConversationState
    where
        S: AuditSink + ?Sized,
    {
        match self.flow.apply_with_audit(state, &DialogueEvent::Abandoned, sink, audit) {
            Ok(outcome) => outcome.to,
            Err(_) => self.initial_state(),
        }
    }

    fn route<S>(
        &self,
        text: &str,
        state: &ConversationState,
        sink: &S,
        audit: &AuditContext,
    ) -> TurnResult
    where
        S: AuditSink + ?Sized,
    {
        let classified = self.router.classify(text);
        match classified.intent {
            Intent::Help | Intent::Unknown => TurnResult {
                outcome: TurnOutcome::Welcome { intent: classified.intent },
                state: state.clone(),
                intent: Some(classified),
            },
            Intent::Chitchat => TurnResult {
                outcome: TurnOutcome::Chitchat,
                state: state.clone(),
                intent: Some(classified),
            },
            Intent::Facts => {
                let query = classified.payload.place.clone().unwrap_or_default();
                let outcome = self.facts(&query, sink, audit);
                TurnResult { outcome, state: state.clone(), intent: Some(classified) }
            }
            Intent::Itinerary => {
                let event = DialogueEvent::ItineraryRequested {
                    city: classified.payload.city.clone(),
                    minutes: classified.payload.minutes,
                };
                self.advance(state, event, Some(classified), sink, audit)
            }
        }
    }

    fn advance<S>(
        &self,
        state: &ConversationState,
        event: DialogueEvent,
        intent: Option<IntentResult>,
        sink: &S,
        audit: &AuditContext,
    ) -> TurnResult
    where
        S: AuditSink + ?Sized,
    {
        match self.flow.apply_with_audit(state, &event, sink, audit) {
            Ok(transition) => {
                let outcome = self.perform(&transition, sink, audit);
                TurnResult { outcome, state: transition.to, intent }
            }
            Err(error) => {
                tracing::warn!(
                    event_name = "dialogue.transition_rejected",
                    correlation_id = %audit.correlation_id,
                    error = %error,
                    "dialogue transition rejected, resetting conversation"
                );
                TurnResult {
                    outcome: TurnOutcome::Welcome { intent: Intent::Unknown },
                    state: self.initial_state(),
                    intent,
                }
            }
        }
    }

    fn perform<S>(&self, transition: &TransitionOutcome, sink: &S, audit: &AuditContext) -> TurnOutcome
    where
        S: AuditSink + ?Sized,
    {
        let confirming_city = matches!(transition.event, DialogueEvent::CityProvided { .. });
        match transition.actions.first() {
            Some(DialogueAction::PromptForCity) => TurnOutcome::PromptCity,
            Some(DialogueAction::PromptForMinutes { city }) => {
                TurnOutcome::PromptMinutes { city: city.clone(), confirming_city }
            }
            Some(DialogueAction::RepromptForMinutes) => TurnOutcome::RepromptMinutes,
            Some(DialogueAction::PackItinerary { city, minutes }) => {
                self.itinerary(city, *minutes, sink, audit)
            }
            None => TurnOutcome::Welcome { intent: Intent::Help },
        }
    }

    fn facts<S>(&self, query: &str, sink: &S, audit: &AuditContext) -> TurnOutcome
    where
        S: AuditSink + ?Sized,
    {
        match PlaceResolver::new(&self.catalog).lookup(query) {
            Some(facts) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "dialogue.facts",
                        AuditCategory::Dialogue,
                        AuditOutcome::Success,
                    )
                    .with_metadata("place", facts.place.as_str()),
                );
                TurnOutcome::Facts(facts)
            }
            None => TurnOutcome::PlaceNotFound { query: query.to_string() },
        }
    }

    fn itinerary<S>(&self, city: &str, minutes: u32, sink: &S, audit: &AuditContext) -> TurnOutcome
    where
        S: AuditSink + ?Sized,
    {
        match ItineraryPacker::new(&self.catalog).plan(city, minutes) {
            Some(plan) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "dialogue.itinerary",
                        AuditCategory::Dialogue,
                        AuditOutcome::Success,
                    )
                    .with_metadata("city", plan.city.as_str())
                    .with_metadata("minutes", plan.total_minutes.to_string())
                    .with_metadata("planned_minutes", plan.planned_minutes.to_string()),
                );
                TurnOutcome::Itinerary(plan)
            }
            None => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "dialogue.itinerary",
                        AuditCategory::Dialogue,
                        AuditOutcome::Failed,
                    )
                    .with_metadata("city", city)
                    .with_metadata("minutes", minutes.to_string()),
                );
                TurnOutcome::PlanFailed { city: city.to_string(), minutes }
            }
        }
    }
}
