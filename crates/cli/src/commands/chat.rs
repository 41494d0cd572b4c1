use std::io::{BufRead, Write};

use tourguide_agent::AgentRuntime;
use tourguide_core::audit::AuditContext;
use uuid::Uuid;

use crate::commands::{load_catalog, CommandResult, EXIT_RUNTIME};

const RESET_COMMAND: &str = "/reset";
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit"];

pub fn run<R: BufRead, W: Write>(input: R, output: W) -> CommandResult {
    let (config, catalog) = match load_catalog("chat") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let agent = match AgentRuntime::from_config(catalog, &config) {
        Ok(agent) => agent,
        Err(error) => {
            return CommandResult::failure("chat", "agent_setup", error.to_string(), EXIT_RUNTIME)
        }
    };
    converse(&agent, input, output)
}

/// Reads one message per line and writes each reply followed by its
/// suggestion chips. Slot state carries across lines.
pub fn converse<R: BufRead, W: Write>(agent: &AgentRuntime, input: R, mut output: W) -> CommandResult {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "async_runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            )
        }
    };

    let audit = AuditContext::new(Some(Uuid::new_v4().to_string()), "cli-chat", "cli");
    let mut state = agent.initial_state();
    let mut turns = 0usize;

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                return CommandResult::failure("chat", "stdin", error.to_string(), EXIT_RUNTIME)
            }
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&message.to_ascii_lowercase().as_str()) {
            break;
        }
        if message.eq_ignore_ascii_case(RESET_COMMAND) {
            state = agent.reset(&state, &audit);
            if let Err(error) = writeln!(output, "(conversation reset)\n") {
                return CommandResult::failure("chat", "stdout", error.to_string(), EXIT_RUNTIME);
            }
            continue;
        }

        let turn = runtime.block_on(agent.handle_turn(message, &state, &audit));
        turns += 1;
        state = turn.state;

        let mut rendered = turn.reply;
        if !turn.suggestions.is_empty() {
            rendered.push_str(&format!("\n[{}]", turn.suggestions.join(" | ")));
        }
        if let Err(error) = writeln!(output, "{rendered}\n") {
            return CommandResult::failure("chat", "stdout", error.to_string(), EXIT_RUNTIME);
        }
    }

    CommandResult::success("chat", format!("chat session ended after {turns} turns"))
}
