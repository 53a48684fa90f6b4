use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("OS keyring is unavailable: {0}")]
    Unavailable(#[source] keyring::Error),

    #[error("OS keyring failed while {operation}: {source}")]
    Os {
        operation: &'static str,
        #[source]
        source: keyring::Error,
    },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keyring record at {path}: {source}")]
    RecordParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize keyring record for {path}: {source}")]
    RecordSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("keyring record at {path} is corrupt: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    #[error("keyring record at {path} has unsupported version {found}; expected 1")]
    UnsupportedVersion { path: PathBuf, found: u32 },

    #[error("failed to encrypt credential: {0}")]
    Encrypt(String),

    #[error("failed to decrypt keyring record at {path}")]
    Decrypt { path: PathBuf },

    #[error("failed to format current UTC timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

impl CredentialStoreError {
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
