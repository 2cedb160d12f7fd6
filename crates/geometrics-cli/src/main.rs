//! geometrics CLI - Command-line interface
//!
//! Evaluates candidate geometry sets against reference sets and reports
//! precision, recall, F1 and mean overlap.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod input;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;
use output::OutputWriter;

fn main() {
    // Logs go to stderr so stdout stays clean for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    if let Err(error) = result {
        let error = match error.downcast::<errors::CliError>() {
            Ok(cli_error) => cli_error,
            Err(other) => errors::from_anyhow(other),
        };

        if json {
            OutputWriter::new(true).error(&error);
        } else {
            error.display();
        }
        std::process::exit(1);
    }
}
