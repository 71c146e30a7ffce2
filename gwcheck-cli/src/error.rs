//! CLI error type and exit codes.

use console::style;
use gwcheck::config::ConfigError;
use gwcheck::logging::LoggingError;
use gwcheck::HarnessError;
use thiserror::Error;

/// Exit code for a run that found a broken invariant or a server error.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for configuration problems, including freshly written
/// placeholders.
pub const EXIT_CONFIG: i32 = 2;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or incomplete configuration.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be set up.
    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    /// A scenario failed.
    #[error("{scenario}: {source}")]
    Scenario {
        scenario: String,
        #[source]
        source: HarnessError,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => EXIT_CONFIG,
            CliError::Logging(_) => EXIT_CONFIG,
            CliError::Scenario { source, .. } if source.is_configuration() => EXIT_CONFIG,
            CliError::Scenario { .. } => EXIT_FAILURE,
        }
    }

    /// Prints the error to stderr.
    pub fn report(&self) {
        eprintln!("{} {}", style("FAIL").red().bold(), self);
    }
}
