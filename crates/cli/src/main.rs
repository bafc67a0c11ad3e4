mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use indexsync_lib::consts::{APP_NAME, CONFIG_FILENAME, ENV_PROJECT};
use indexsync_lib::reconcile::ReconcileOptions;

use cmd::Target;

/// indexsync - Keep Firestore composite indexes and field overrides in line with an index file
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the project configuration file
  #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
  config: PathBuf,

  /// Google Cloud project id (overrides the configuration file)
  #[arg(short, long, global = true, env = ENV_PROJECT)]
  project: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Make every configured database match its index file
  Deploy {
    /// Only deploy this database
    #[arg(long)]
    only: Option<String>,

    /// Delete unlisted indexes and field overrides without asking
    #[arg(short, long)]
    force: bool,

    /// Never prompt; unlisted indexes and field overrides are kept unless --force is set
    #[arg(long)]
    non_interactive: bool,

    /// Output the reports as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show what deploy would change, without changing anything
  Plan {
    /// Only plan this database
    #[arg(long)]
    only: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// List the live indexes and field overrides of the configured databases
  List {
    /// Only list this database
    #[arg(long)]
    only: Option<String>,

    /// Output an index file describing the live state
    #[arg(long)]
    json: bool,
  },

  /// List the Firestore databases of the project
  Databases {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// List the locations available to the project
  Locations {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(format!("warn,{APP_NAME}={level},indexsync_lib={level}")));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let target = Target {
    config: cli.config,
    project: cli.project,
  };

  match cli.command {
    Commands::Deploy {
      only,
      force,
      non_interactive,
      json,
    } => cmd::cmd_deploy(
      &target,
      only.as_deref(),
      ReconcileOptions { force, non_interactive },
      json,
    ),
    Commands::Plan { only, json } => cmd::cmd_plan(&target, only.as_deref(), json),
    Commands::List { only, json } => cmd::cmd_list(&target, only.as_deref(), json),
    Commands::Databases { json } => cmd::cmd_databases(&target, json),
    Commands::Locations { json } => cmd::cmd_locations(&target, json),
  }
}
