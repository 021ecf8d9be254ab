use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, Settings, check::CheckArgs, journey::JourneyArgs, schema::SchemaArgs,
    validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "form-runner",
    about = "Check form definitions and reconcile answer state against them",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Engine settings (TOML)
    #[arg(long = "config", value_name = "config.toml", global = true)]
    config: Option<PathBuf>,

    /// Evaluate relative dates as if today were this day
    #[arg(long = "today", value_name = "YYYY-MM-DD", global = true)]
    today: Option<String>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a definition and print its pages, links and conditions
    Check(CheckArgs),
    /// Show the pages an answer state walks through
    Journey(JourneyArgs),
    /// Reconcile an answer state: prune stale answers and report errors
    Validate(ValidateArgs),
    /// Print the JSON Schema composed for an answer state
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let settings = Settings::load(cli.config.as_deref(), cli.today.as_deref())?;
    match cli.command {
        Commands::Check(args) => cmd::check::run(&args, &settings),
        Commands::Journey(args) => cmd::journey::run(&args, &settings),
        Commands::Validate(args) => cmd::validate::run(&args, &settings),
        Commands::Schema(args) => cmd::schema::run(&args, &settings),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
