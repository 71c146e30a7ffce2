//! gwcheck CLI - Command-line interface
//!
//! Runs cache coherence scenarios against a tile server cluster and reports
//! PASS, or the first broken invariant.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use gwcheck::config::DEFAULT_CONFIG_FILE;
use gwcheck::logging::{init_logging, LoggingOptions};

use commands::config::ConfigCommands;
use commands::run::ScenarioArg;
use error::CliError;

#[derive(Parser)]
#[command(name = "gwcheck")]
#[command(version, about = "Cache coherence checks for clustered tile servers", long_about = None)]
struct Cli {
    /// Configuration file; created with placeholders if missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log HTTP exchanges and other debug detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a verification scenario, or all of them
    Run {
        #[arg(value_enum)]
        scenario: ScenarioArg,
    },

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let options = LoggingOptions {
        verbose: cli.verbose,
        log_file: cli.log_file.clone(),
    };
    let _guard = match init_logging(&options) {
        Ok(guard) => guard,
        Err(e) => exit_with(CliError::from(e)),
    };

    let result = match cli.command {
        Commands::Run { scenario } => commands::run::run(&cli.config, scenario),
        Commands::Config { command } => commands::config::run(&cli.config, command),
    };

    if let Err(e) = result {
        exit_with(e);
    }
}

fn exit_with(error: CliError) -> ! {
    error.report();
    process::exit(error.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_global_options() {
        let cli = Cli::try_parse_from([
            "gwcheck",
            "run",
            "parameter-filter",
            "--config",
            "cluster.ini",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("cluster.ini"));
        assert!(matches!(
            cli.command,
            Commands::Run {
                scenario: ScenarioArg::ParameterFilter
            }
        ));
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["gwcheck", "config", "path"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        assert!(Cli::try_parse_from(["gwcheck", "run", "seeding"]).is_err());
    }
}
