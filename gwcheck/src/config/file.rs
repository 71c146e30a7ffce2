//! The INI file backing a run.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::{info, warn};

use super::credentials::{credential_keys, TYPE};
use super::{ConfigError, ConfigSchema};
use crate::auth::CredentialKind;

/// File name used when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gwcheck.ini";

/// A loaded configuration file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    ini: Ini,
}

impl ConfigFile {
    /// Loads `path`, filling in placeholders for keys of `schema` that are
    /// missing.
    ///
    /// Credential sections get the keys their configured `type` needs; an
    /// unknown type is left for
    /// [`credential_from_section`](super::credential_from_section) to report.
    ///
    /// The file is created if it does not exist. If any placeholder was
    /// added, the file is written back and
    /// [`MissingValues`](ConfigError::MissingValues) lists what was added.
    pub fn bootstrap(path: impl Into<PathBuf>, schema: &ConfigSchema) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            info!(path = %path.display(), "Creating configuration file");
            fs::write(&path, "").map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let mut config = Self::load(&path)?;
        let mut added = Vec::new();
        for entry in schema.entries() {
            if config.get(&entry.section, &entry.key).is_none() {
                config.set(&entry.section, &entry.key, &entry.placeholder);
                added.push(entry.qualified_name());
            }
        }
        for section in schema.credential_sections() {
            let Some(Ok(kind)) = config
                .get(section, TYPE)
                .map(str::parse::<CredentialKind>)
            else {
                continue;
            };
            for (key, placeholder) in credential_keys(kind) {
                if config.get(section, key).is_none() {
                    config.set(section, key, placeholder);
                    added.push(format!("{}.{}", section, key));
                }
            }
        }

        if !added.is_empty() {
            warn!(path = %path.display(), keys = ?added, "Configuration values missing");
            config.save()?;
            return Err(ConfigError::MissingValues { path, keys: added });
        }
        Ok(config)
    }

    /// Loads `path` as is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let ini = Ini::load_from_file(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { path, ini })
    }

    /// An empty configuration that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ini: Ini::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini.get_from(Some(section), key)
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// The value of a key that must be present.
    pub fn require(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.get(section, key).ok_or_else(|| ConfigError::Missing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// A boolean key; accepts `true/false`, `yes/no`, `on/off` and `1/0`.
    pub fn get_bool(&self, section: &str, key: &str) -> Result<bool, ConfigError> {
        let value = self.require(section, key)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ConfigError::invalid(section, key, value, "expected a boolean")),
        }
    }

    pub fn get_u64(&self, section: &str, key: &str) -> Result<u64, ConfigError> {
        let value = self.require(section, key)?;
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(section, key, value, "expected a whole number"))
    }

    /// A whole number key that must be at least 1.
    pub fn get_positive_u64(&self, section: &str, key: &str) -> Result<u64, ConfigError> {
        match self.get_u64(section, key)? {
            0 => Err(ConfigError::invalid(section, key, "0", "must be at least 1")),
            value => Ok(value),
        }
    }

    /// A comma separated key, with blank items dropped.
    pub fn get_list(&self, section: &str, key: &str) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .require(section, key)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// All key/value pairs of a section, in file order.
    pub fn section_entries(&self, section: &str) -> Vec<(String, String)> {
        self.ini
            .section(Some(section))
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of all sections, in file order.
    pub fn section_names(&self) -> Vec<String> {
        self.ini
            .sections()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.ini
            .write_to_file(&self.path)
            .map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
