use std::process::ExitCode;

fn main() -> ExitCode {
    tourguide_cli::run()
}
