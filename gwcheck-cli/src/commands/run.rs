//! Run command - execute verification scenarios against the cluster.

use std::path::Path;

use clap::ValueEnum;
use console::style;
use gwcheck::config::ConfigFile;
use gwcheck::{Harness, Scenario};

use crate::error::CliError;

/// Scenario selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ScenarioArg {
    /// Layer configured and served on every node
    Basics,
    /// Gridset creation and tile size change
    Gridset,
    /// Layer moved onto a file blob store
    FileBlobstore,
    /// S3 blob store creation
    S3Blobstore,
    /// String parameter filter partitioning and normalization
    ParameterFilter,
    /// Every scenario in turn
    All,
}

impl ScenarioArg {
    /// The scenarios this selection runs, in order.
    pub fn scenarios(self) -> Vec<Scenario> {
        match self {
            ScenarioArg::Basics => vec![Scenario::Basics],
            ScenarioArg::Gridset => vec![Scenario::Gridset],
            ScenarioArg::FileBlobstore => vec![Scenario::FileBlobStore],
            ScenarioArg::S3Blobstore => vec![Scenario::S3BlobStore],
            ScenarioArg::ParameterFilter => vec![Scenario::ParameterFilter],
            ScenarioArg::All => Scenario::all().to_vec(),
        }
    }
}

/// Run the selected scenarios, stopping at the first failure.
pub fn run(config_path: &Path, selection: ScenarioArg) -> Result<(), CliError> {
    let scenarios = selection.scenarios();
    let schema = Scenario::combined_schema(&scenarios);
    let config = ConfigFile::bootstrap(config_path, &schema)?;

    let harness = Harness::from_config(config).map_err(|source| CliError::Scenario {
        scenario: "setup".to_string(),
        source,
    })?;

    for scenario in &scenarios {
        scenario.run(&harness).map_err(|source| CliError::Scenario {
            scenario: scenario.to_string(),
            source,
        })?;
        println!("{} {}", style("ok").green(), scenario);
    }

    println!("{}", style("PASS").green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selects_every_scenario() {
        assert_eq!(ScenarioArg::All.scenarios(), Scenario::all());
        assert_eq!(ScenarioArg::Gridset.scenarios(), vec![Scenario::Gridset]);
    }

    #[test]
    fn test_argument_names_match_scenario_names() {
        for arg in ScenarioArg::value_variants() {
            if *arg == ScenarioArg::All {
                continue;
            }
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(arg.scenarios()[0].name(), name);
        }
    }

    #[test]
    fn test_run_writes_placeholders_for_a_new_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gwcheck.ini");

        let err = run(&path, ScenarioArg::FileBlobstore).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[file_blobstore]"));
        assert!(written.contains("[admin_credential]"));
    }
}
