//! Configuration CLI commands.
//!
//! Provides `config path` and `config show` for inspecting the INI file a
//! run would use.

use std::path::Path;

use clap::Subcommand;
use gwcheck::config::ConfigFile;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print every configured value, with secrets masked
    Show,
}

/// Run a config subcommand.
pub fn run(config_path: &Path, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(config_path),
        ConfigCommands::Show => run_show(config_path),
    }
}

fn run_path(config_path: &Path) -> Result<(), CliError> {
    println!("{}", config_path.display());
    Ok(())
}

fn run_show(config_path: &Path) -> Result<(), CliError> {
    if !config_path.exists() {
        println!("{} does not exist yet; run a scenario to create it.", config_path.display());
        return Ok(());
    }
    let config = ConfigFile::load(config_path)?;
    print!("{}", render(&config));
    Ok(())
}

/// Formats the file section by section.
fn render(config: &ConfigFile) -> String {
    let mut out = String::new();
    for (i, section) in config.section_names().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", section));
        for (key, value) in config.section_entries(section) {
            let shown = if is_secret(&key) { "********" } else { value.as_str() };
            out.push_str(&format!("  {} = {}\n", key, shown));
        }
    }
    out
}

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["password", "secret", "token"]
        .iter()
        .any(|marker| key.contains(marker))
}
