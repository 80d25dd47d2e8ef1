//! Kraftload CLI - manage the installed version of a remotely published
//! artifact.
//!
//! ```text
//! kraftload status
//! kraftload update
//! kraftload rollback
//! kraftload compute add 2 3
//! ```

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use kraftload::logging::init_logging;
use kraftload::manager::LifecycleController;
use tracing::debug;

use commands::common::{resolve_config, Overrides};
use commands::config::ConfigCommands;
use commands::lifecycle;
use error::CliError;
use output::{ConsoleOutput, Output};

#[derive(Debug, Parser)]
#[command(name = "kraftload", version, about = "Versioned artifact lifecycle manager")]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local storage root for installed versions
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Name of the managed artifact
    #[arg(long, global = true)]
    artifact: Option<String>,

    /// Bucket holding published versions
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// Object store base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show installed, latest and previous versions
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List remote and local versions
    Versions,

    /// Install and load the latest published version
    Update,

    /// Load the previous version and delete the current one
    Rollback,

    /// Run an operation on the loaded version
    Compute {
        /// Operation: add, subtract or multiply
        op: String,
        /// First operand
        #[arg(allow_hyphen_values = true)]
        a: String,
        /// Second operand
        #[arg(allow_hyphen_values = true)]
        b: String,
    },

    /// Show the README published with a version
    Readme {
        /// Version to look up
        version: String,
    },

    /// Configuration file commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            storage_dir: self.storage_dir.clone(),
            artifact: self.artifact.clone(),
            bucket: self.bucket.clone(),
            base_url: self.base_url.clone(),
            verbose: self.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = cli.overrides();
    let out = ConsoleOutput::new();

    if let Commands::Config(command) = cli.command {
        return commands::config::run(command, &overrides, &out);
    }

    let config = resolve_config(&overrides)?;
    let _log_guard = init_logging(&config.log_config())?;
    debug!(artifact = %config.artifact, storage_dir = %config.storage_dir.display(), "Configuration loaded");

    let ctl = LifecycleController::new(config.manager_config())?;
    dispatch(cli.command, &overrides, &ctl, &out)
}

fn dispatch(
    command: Commands,
    overrides: &Overrides,
    ctl: &LifecycleController,
    out: &dyn Output,
) -> Result<(), CliError> {
    match command {
        Commands::Status { json } => lifecycle::status(ctl, json, out),
        Commands::Versions => lifecycle::versions(ctl, out),
        Commands::Update => lifecycle::update(ctl, out),
        Commands::Rollback => lifecycle::rollback(ctl, out),
        Commands::Compute { op, a, b } => lifecycle::compute(ctl, &op, &a, &b, out),
        Commands::Readme { version } => lifecycle::readme(ctl, &version, out),
        Commands::Config(command) => commands::config::run(command, overrides, out),
    }
}
