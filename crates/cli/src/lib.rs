pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tourguide",
    about = "Tourguide operator CLI",
    long_about = "Inspect configuration and the place catalog, plan mini tours, and talk to the guide from a terminal.",
    after_help = "Examples:\n  tourguide doctor --json\n  tourguide search \"rock fortress\"\n  tourguide plan Kandy 150\n  tourguide ask \"Tell me about Sigiriya\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog readiness, and polish provider setup")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List catalog place names in sorted order")]
    Places,
    #[command(about = "Keyword search over names, cities, highlights, and facts")]
    Search {
        #[arg(help = "Free-text query, e.g. \"tea country\"")]
        query: String,
    },
    #[command(about = "Pack a mini tour for a city within a time budget")]
    Plan {
        city: String,
        #[arg(help = "Budget in minutes (raised to 45 when smaller)")]
        minutes: u32,
    },
    #[command(about = "Run one message through the full guide pipeline")]
    Ask { message: String },
    #[command(about = "Interactive conversation on stdin; `/reset` clears slots, `exit` quits")]
    Chat,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Places => commands::places::run(),
        Command::Search { query } => commands::search::run(&query),
        Command::Plan { city, minutes } => commands::plan::run(&city, minutes),
        Command::Ask { message } => commands::ask::run(&message),
        Command::Chat => {
            let stdin = std::io::stdin();
            commands::chat::run(stdin.lock(), std::io::stdout())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
