use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tourguide_core::audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink,
};
use tourguide_core::config::AppConfig;
use tourguide_core::flows::ConversationState;
use tourguide_core::Catalog;

use crate::composer::{Reply, ReplyComposer};
use crate::dialogue::DialogueManager;
use crate::guardrails::{sanitize, GateDecision, PatternSafetyGate, SafetyGate};
use crate::polish::{polisher_from_config, Polisher};

const DEFAULT_POLISH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply: String,
    pub suggestions: Vec<String>,
    pub state: ConversationState,
    pub outcome: String,
}

/// Full turn pipeline: input gate, dialogue, composer, polish, output gate.
pub struct AgentRuntime {
    dialogue: DialogueManager,
    composer: ReplyComposer,
    gate: Arc<dyn SafetyGate>,
    polisher: Option<Arc<dyn Polisher>>,
    polish_timeout: Duration,
    audit_sink: Arc<dyn AuditSink>,
}

impl AgentRuntime {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let composer = ReplyComposer::new(&catalog);
        Self {
            dialogue: DialogueManager::new(catalog),
            composer,
            gate: Arc::new(PatternSafetyGate::default()),
            polisher: None,
            polish_timeout: DEFAULT_POLISH_TIMEOUT,
            audit_sink: Arc::new(TracingAuditSink),
        }
    }

    pub fn from_config(catalog: Arc<Catalog>, config: &AppConfig) -> Result<Self> {
        let polisher = polisher_from_config(&config.polish)?;
        Ok(Self::new(catalog)
            .with_safety_gate(Arc::new(PatternSafetyGate::new(config.safety.enabled)))
            .with_polisher(polisher, Duration::from_secs(config.polish.timeout_secs)))
    }

    pub fn with_safety_gate(mut self, gate: Arc<dyn SafetyGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_polisher(mut self, polisher: Option<Arc<dyn Polisher>>, timeout: Duration) -> Self {
        self.polisher = polisher;
        self.polish_timeout = timeout;
        self
    }

    pub fn with_audit_sink(mut self, audit_sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = audit_sink;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.dialogue.catalog()
    }

    pub fn polisher_name(&self) -> Option<&'static str> {
        self.polisher.as_ref().map(|polisher| polisher.name())
    }

    pub fn initial_state(&self) -> ConversationState {
        self.dialogue.initial_state()
    }

    pub fn reset(&self, state: &ConversationState, audit: &AuditContext) -> ConversationState {
        self.dialogue.reset(state, self.audit_sink.as_ref(), audit)
    }

    pub async fn handle_turn(
        &self,
        text: &str,
        state: &ConversationState,
        audit: &AuditContext,
    ) -> TurnReply {
        if let GateDecision::Block { reason_code, detail } = self.gate.check_input(text) {
            self.audit_sink.emit(
                AuditEvent::new(
                    audit,
                    "safety.input_blocked",
                    AuditCategory::Safety,
                    AuditOutcome::Rejected,
                )
                .with_metadata("reason_code", reason_code)
                .with_metadata("detail", detail)
                .with_metadata("text", text),
            );
            tracing::warn!(
                event_name = "safety.input_blocked",
                correlation_id = %audit.correlation_id,
                session_id = audit.session_id.as_deref().unwrap_or("unknown"),
                reason_code,
                "input blocked by safety gate"
            );
            return reply_with(self.composer.input_blocked(), state.clone(), "input_blocked");
        }

        let sanitized = sanitize(text);
        let result = self.dialogue.turn(&sanitized, state, self.audit_sink.as_ref(), audit);
        let composed = self.composer.compose(&result.outcome);
        let polished = self.polish(&composed.text, audit).await;

        let outcome = result.outcome.kind();
        let reply = match self.gate.check_output(&polished) {
            GateDecision::Allow => Reply { text: polished, suggestions: composed.suggestions },
            GateDecision::Block { reason_code, detail } => {
                self.audit_sink.emit(
                    AuditEvent::new(
                        audit,
                        "safety.output_blocked",
                        AuditCategory::Safety,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("reason_code", reason_code)
                    .with_metadata("detail", detail)
                    .with_metadata("original_text", composed.text.as_str())
                    .with_metadata("polished_text", polished),
                );
                tracing::warn!(
                    event_name = "safety.output_blocked",
                    correlation_id = %audit.correlation_id,
                    reason_code,
                    "reply blocked by safety gate"
                );
                self.composer.output_blocked()
            }
        };

        tracing::info!(
            event_name = "dialogue.turn.completed",
            correlation_id = %audit.correlation_id,
            session_id = audit.session_id.as_deref().unwrap_or("unknown"),
            outcome,
            pending = ?result.state.pending(),
            "turn completed"
        );

        reply_with(reply, result.state, outcome)
    }

    async fn polish(&self, text: &str, audit: &AuditContext) -> String {
        let Some(polisher) = &self.polisher else {
            return text.to_string();
        };

        match tokio::time::timeout(self.polish_timeout, polisher.polish(text)).await {
            Ok(Ok(polished)) if !polished.trim().is_empty() => polished,
            Ok(Ok(_)) => text.to_string(),
            Ok(Err(error)) => {
                tracing::warn!(
                    event_name = "polish.failed",
                    correlation_id = %audit.correlation_id,
                    polisher = polisher.name(),
                    error = %error,
                    "polish failed, using composed reply"
                );
                text.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    event_name = "polish.timed_out",
                    correlation_id = %audit.correlation_id,
                    polisher = polisher.name(),
                    timeout_ms = self.polish_timeout.as_millis() as u64,
                    "polish timed out, using composed reply"
                );
                text.to_string()
            }
        }
    }
}

fn reply_with(reply: Reply, state: ConversationState, outcome: &str) -> TurnReply {
    TurnReply {
        reply: reply.text,
        suggestions: reply.suggestions,
        state,
        outcome: outcome.to_string(),
    }
}
