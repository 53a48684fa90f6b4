//! Configuration file handling.

mod containers;
mod paths;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use container_runtime::ContainerSpec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use containers::{ContainerConfig, EmulatorType, DEFAULT_PORT, DEFAULT_TAG};
pub use paths::{config_dir_of, ConfigLocations, LOCAL_CONFIG_FILE_NAME, USER_CONFIG_FILE_NAME};

const DEFAULT_CONFIG_FILE: &str = r#"# lstk configuration
#
# Each [[containers]] entry is one emulator started by `lstk`.

[[containers]]
type = "aws"
tag = "latest"
port = 4566
# env = ["DEBUG=1"]
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{emulator} emulator not supported yet by lstk")]
    Unsupported { emulator: EmulatorType },

    #[error("could not determine a configuration directory")]
    NoConfigDir,

    #[error("no containers configured in {}", path.display())]
    NoContainers { path: PathBuf },

    #[error("I/O error while {operation} at {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub containers: Vec<ContainerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            containers: vec![ContainerConfig::default()],
        }
    }
}

/// A parsed configuration together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

impl LoadedConfig {
    /// Directory of the config file; the file keyring lives beneath it.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        config_dir_of(&self.path)
    }
}

impl Config {
    pub fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::io("reading config file", path, source))?;
        Self::parse(path, &raw)
    }

    /// Loads the first config file found, writing the default one when none exists.
    pub fn load_or_create(locations: &ConfigLocations) -> Result<LoadedConfig, ConfigError> {
        let existing = locations.first_existing().map_err(|source| {
            ConfigError::io("searching for config file", &locations.working_dir, source)
        })?;
        if let Some(path) = existing {
            let config = Self::load(&path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            return Ok(LoadedConfig { config, path });
        }

        let dir = locations.creation_dir().ok_or(ConfigError::NoConfigDir)?;
        fs::create_dir_all(&dir)
            .map_err(|source| ConfigError::io("creating config directory", &dir, source))?;
        let path = dir.join(USER_CONFIG_FILE_NAME);
        fs::write(&path, DEFAULT_CONFIG_FILE)
            .map_err(|source| ConfigError::io("writing default config file", &path, source))?;
        tracing::info!(path = %path.display(), "created default config file");

        Ok(LoadedConfig {
            config: Self::parse(&path, DEFAULT_CONFIG_FILE)?,
            path,
        })
    }

    /// Resolves every configured container, failing on the first unsupported entry.
    pub fn resolve_specs(&self) -> Result<Vec<ContainerSpec>, ConfigError> {
        self.containers.iter().map(ContainerConfig::resolve).collect()
    }
}
