use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geometrics - agreement metrics between geometry sets
#[derive(Parser, Debug)]
#[command(name = "geometrics")]
#[command(about = "Agreement metrics between reference and candidate geometry sets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match candidates against references and report metrics
    Evaluate(EvaluateArgs),

    /// Validate every shape of an input file without matching
    Validate(ValidateArgs),

    /// Show the effective configuration and where each value comes from
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Input JSON file with evaluation units
    pub input: PathBuf,

    /// Minimum overlap score for a match, in [0, 1]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Assignment strategy (greedy or optimal)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Report metrics per category
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub per_category: Option<bool>,

    /// Match shapes regardless of their category
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub class_agnostic: Option<bool>,

    /// Drop candidates whose confidence is below this value
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Distance at which point and line scores decay to zero
    #[arg(long)]
    pub point_radius: Option<f64>,

    /// Units with more shapes than this on either side are counted as failed
    #[arg(long)]
    pub max_shapes_per_unit: Option<usize>,

    /// Number of units evaluated concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Configuration file (defaults to ./geometrics.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the report as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Input JSON file with evaluation units
    pub input: PathBuf,

    /// List every excluded shape with its reason
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file (defaults to ./geometrics.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
