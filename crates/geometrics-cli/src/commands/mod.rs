//! Command implementations

mod config;
mod evaluate;
mod validate;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Evaluate(args) => evaluate::execute(args, &output).await,
        Commands::Validate(args) => validate::execute(args, &output),
        Commands::Config(args) => config::execute(args, &output),
    }
}
