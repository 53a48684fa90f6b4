use container_runtime::RuntimeError;
use platform_api::PlatformApiError;
use thiserror::Error;

use crate::output::SilentError;

#[derive(Debug, Error)]
pub enum StartError {
    /// The engine check failed; the sink already shows why.
    #[error("runtime not healthy")]
    RuntimeUnhealthy(#[source] SilentError),

    #[error("failed to check whether {name} is running: {source}")]
    Inspect {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("port {port} already in use\n{hint}")]
    PortInUse { port: u16, hint: String },

    #[error("failed to remove stale container {name}: {source}")]
    RemoveStale {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("failed to pull image {image}: {source}")]
    Pull {
        image: String,
        #[source]
        source: RuntimeError,
    },

    #[error("failed to determine version of {image}: {source}")]
    Version {
        image: String,
        #[source]
        source: RuntimeError,
    },

    #[error("license validation failed for {product}:{version}: {source}")]
    License {
        product: String,
        version: String,
        #[source]
        source: PlatformApiError,
    },

    #[error("failed to start {name}: {source}")]
    Start {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("failed to check container status: {0}")]
    Status(#[source] RuntimeError),

    #[error("{name} exited unexpectedly{}", logs_suffix(.logs))]
    Exited { name: String, logs: Option<String> },

    #[error("failed to build health check client: {0}")]
    HealthClient(#[source] reqwest::Error),

    #[error("start cancelled")]
    Cancelled,
}

fn logs_suffix(logs: &Option<String>) -> String {
    match logs {
        Some(logs) => format!(":\n{logs}"),
        None => String::new(),
    }
}

impl StartError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum StopError {
    #[error("{name} is not running")]
    NotRunning { name: String },

    #[error("Failed to stop {name}\n{source}")]
    Failed {
        name: String,
        #[source]
        source: RuntimeError,
    },
}

#[derive(Debug, Error)]
pub enum LogsError {
    #[error("emulator is not running. Start LocalStack with `lstk`")]
    NotRunning,

    #[error("failed to read logs of {name}: {source}")]
    Runtime {
        name: String,
        #[source]
        source: RuntimeError,
    },
}
