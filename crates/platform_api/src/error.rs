use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to {operation}: status {}", status.as_u16())]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The platform refused to issue a license; `reason` is the user-facing explanation.
    #[error("{reason}")]
    LicenseRejected { status: StatusCode, reason: String },

    #[error("license request failed with status {}", status.as_u16())]
    LicenseStatus { status: StatusCode },
}

impl PlatformApiError {
    #[must_use]
    pub fn request(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Request { operation, source }
    }

    #[must_use]
    pub fn decode(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Decode { operation, source }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. }
            | Self::LicenseRejected { status, .. }
            | Self::LicenseStatus { status } => Some(*status),
            Self::Request { source, .. } | Self::Decode { source, .. } | Self::Client(source) => {
                source.status()
            }
        }
    }
}

/// Maps a non-200 license activation status to its user-facing error.
#[must_use]
pub fn license_error(status: StatusCode) -> PlatformApiError {
    match status {
        StatusCode::BAD_REQUEST => PlatformApiError::LicenseRejected {
            status,
            reason: "invalid token format, missing license assignment, or missing subscription"
                .to_string(),
        },
        StatusCode::FORBIDDEN => PlatformApiError::LicenseRejected {
            status,
            reason: "invalid, inactive, or expired authentication token or subscription"
                .to_string(),
        },
        _ => PlatformApiError::LicenseStatus { status },
    }
}
