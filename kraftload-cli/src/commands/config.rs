//! `config path` and `config show`.

use clap::Subcommand;
use kraftload::config::ConfigFile;

use super::common::{config_path, resolve_config, Overrides};
use crate::error::CliError;
use crate::output::Output;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file plus flags)
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, overrides: &Overrides, out: &dyn Output) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            let path = config_path(overrides)?;
            out.println(&path.display().to_string());
            if !path.exists() {
                out.warning("File does not exist; built-in defaults are in effect.");
            }
            Ok(())
        }
        ConfigCommands::Show => {
            let config = resolve_config(overrides)?;
            print_config(out, &config)
        }
    }
}

fn print_config(out: &dyn Output, config: &ConfigFile) -> Result<(), CliError> {
    for line in config.to_ini()?.lines() {
        out.println(line);
    }
    Ok(())
}
