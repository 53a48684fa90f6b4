use std::fmt;

use container_runtime::ContainerSpec;
use serde::{Deserialize, Serialize};

use super::ConfigError;

pub const DEFAULT_TAG: &str = "latest";
pub const DEFAULT_PORT: u16 = 4566;
const DOCKER_REGISTRY: &str = "localstack";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulatorType {
    Aws,
    Snowflake,
    Azure,
}

impl EmulatorType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Snowflake => "snowflake",
            Self::Azure => "azure",
        }
    }
}

impl fmt::Display for EmulatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct EmulatorImage {
    product: &'static str,
    health_path: &'static str,
}

fn registry(emulator: EmulatorType) -> Option<EmulatorImage> {
    match emulator {
        EmulatorType::Aws => Some(EmulatorImage {
            product: "localstack-pro",
            health_path: "/_localstack/health",
        }),
        EmulatorType::Snowflake | EmulatorType::Azure => None,
    }
}

/// One `[[containers]]` entry of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "type")]
    pub emulator: EmulatorType,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            emulator: EmulatorType::Aws,
            tag: default_tag(),
            port: DEFAULT_PORT,
            env: Vec::new(),
        }
    }
}

impl ContainerConfig {
    fn effective_tag(&self) -> &str {
        match self.tag.trim() {
            "" => DEFAULT_TAG,
            tag => tag,
        }
    }

    /// `localstack-{type}`, suffixed with the tag unless it is `latest`.
    #[must_use]
    pub fn name(&self) -> String {
        match self.effective_tag() {
            DEFAULT_TAG => format!("localstack-{}", self.emulator),
            tag => format!("localstack-{}-{tag}", self.emulator),
        }
    }

    pub fn product_name(&self) -> Result<&'static str, ConfigError> {
        self.image_entry().map(|entry| entry.product)
    }

    pub fn image(&self) -> Result<String, ConfigError> {
        let product = self.product_name()?;
        Ok(format!("{DOCKER_REGISTRY}/{product}:{}", self.effective_tag()))
    }

    pub fn health_path(&self) -> Result<&'static str, ConfigError> {
        self.image_entry().map(|entry| entry.health_path)
    }

    /// Resolves this entry against the image registry.
    pub fn resolve(&self) -> Result<ContainerSpec, ConfigError> {
        let entry = self.image_entry()?;
        Ok(ContainerSpec {
            image: format!("{DOCKER_REGISTRY}/{}:{}", entry.product, self.effective_tag()),
            name: self.name(),
            port: self.port,
            health_path: entry.health_path.to_string(),
            env: self.env.clone(),
            product: entry.product.to_string(),
            tag: self.effective_tag().to_string(),
        })
    }

    fn image_entry(&self) -> Result<EmulatorImage, ConfigError> {
        registry(self.emulator).ok_or(ConfigError::Unsupported {
            emulator: self.emulator,
        })
    }
}
