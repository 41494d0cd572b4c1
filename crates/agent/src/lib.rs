//! Conversation layer of the tour guide.
//!
//! Each turn runs through a fixed pipeline:
//! 1. **Input gate** (`guardrails`) - block unsafe text, then sanitize it
//! 2. **Dialogue** (`dialogue`) - fill a pending slot, or classify with `intent`
//! 3. **Composition** (`composer`) - deterministic reply text and follow-up chips
//! 4. **Polish** (`polish`) - optional rewrite, dropped on error or timeout
//! 5. **Output gate** (`guardrails`) - veto the final text if needed
//!
//! Facts, plans and prompts are decided by `tourguide-core`. The polisher only
//! rewords what the composer produced.

pub mod composer;
pub mod dialogue;
pub mod guardrails;
pub mod intent;
pub mod polish;
pub mod runtime;

pub use composer::{Reply, ReplyComposer, TurnOutcome};
pub use dialogue::{DialogueManager, TurnResult};
pub use guardrails::{GateDecision, PatternSafetyGate, SafetyGate};
pub use intent::{Intent, IntentResult, IntentRouter};
pub use polish::{LocalPolisher, Polisher};
pub use runtime::{AgentRuntime, TurnReply};
