use tourguide_agent::AgentRuntime;
use tourguide_core::audit::AuditContext;
use uuid::Uuid;

use crate::commands::{load_catalog, CommandResult, EXIT_RUNTIME};

pub fn run(message: &str) -> CommandResult {
    let (config, catalog) = match load_catalog("ask") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let agent = match AgentRuntime::from_config(catalog, &config) {
        Ok(agent) => agent,
        Err(error) => {
            return CommandResult::failure("ask", "agent_setup", error.to_string(), EXIT_RUNTIME)
        }
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "async_runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            )
        }
    };

    let audit = AuditContext::new(None, Uuid::new_v4().to_string(), "cli");
    let turn = runtime.block_on(agent.handle_turn(message, &agent.initial_state(), &audit));
    CommandResult::success_with_data("ask", turn.outcome.clone(), Some(turn))
}
