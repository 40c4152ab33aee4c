use clap::Parser;
use filesort::output::OutputFormatter;
use filesort::{CancelToken, Cli, run_cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if !cli.json {
        println!("Welcome to filesort - every extension gets its own folder!");
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        OutputFormatter::warning(&format!("Could not install Ctrl-C handler: {}", e));
    }

    match run_cli(&cli, cancel) {
        Ok(summary) if summary.cancelled => ExitCode::from(130),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
