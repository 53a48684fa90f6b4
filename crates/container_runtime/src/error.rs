use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no such container or image: {target}")]
    NotFound { target: String },

    #[error("Docker is not available")]
    Unavailable(#[source] bollard::errors::Error),

    #[error("failed to {operation}: {source}")]
    Docker {
        operation: &'static str,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("image pull failed: {0}")]
    PullFailed(String),

    #[error("LOCALSTACK_BUILD_VERSION not found in image environment")]
    VersionNotFound,
}

impl RuntimeError {
    /// Wraps an engine error, folding HTTP 404 into [`RuntimeError::NotFound`].
    #[must_use]
    pub fn docker(operation: &'static str, target: &str, source: bollard::errors::Error) -> Self {
        match source {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => Self::NotFound {
                target: target.to_string(),
            },
            source => Self::Docker { operation, source },
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
