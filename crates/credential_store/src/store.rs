use std::path::Path;

use crate::backend::Keyring;
use crate::error::CredentialStoreError;
use crate::file::FileKeyring;
use crate::os::OsKeyring;
use crate::paths::keyring_dir;

pub const SERVICE_NAME: &str = "lstk";
pub const AUTH_TOKEN_KEY: &str = "lstk.auth-token";
pub const AUTH_TOKEN_LABEL: &str = "lstk auth token";
pub const FILE_PASSPHRASE: &str = "lstk-keyring";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// OS keyring, falling back to the file store when it cannot be opened.
    #[default]
    Auto,
    File,
}

impl BackendPreference {
    /// Parses the `LSTK_KEYRING` setting; only `file` changes the default.
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("file") => Self::File,
            _ => Self::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Os,
    File,
    Custom,
}

/// Single-credential store for the lstk auth token.
pub struct CredentialStore {
    ring: Box<dyn Keyring>,
    backend: Backend,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn open(
        config_dir: &Path,
        preference: BackendPreference,
    ) -> Result<Self, CredentialStoreError> {
        Self::open_with(config_dir, preference, || {
            OsKeyring::open(SERVICE_NAME).map(|ring| Box::new(ring) as Box<dyn Keyring>)
        })
    }

    /// Applies the backend policy with a caller-supplied OS store opener.
    pub fn open_with<F>(
        config_dir: &Path,
        preference: BackendPreference,
        open_os: F,
    ) -> Result<Self, CredentialStoreError>
    where
        F: FnOnce() -> Result<Box<dyn Keyring>, CredentialStoreError>,
    {
        if preference == BackendPreference::File {
            return Self::open_file(config_dir);
        }

        match open_os() {
            Ok(ring) => Ok(Self {
                ring,
                backend: Backend::Os,
            }),
            Err(error) => {
                tracing::warn!(%error, "OS keyring unavailable, using encrypted file store");
                Self::open_file(config_dir)
            }
        }
    }

    fn open_file(config_dir: &Path) -> Result<Self, CredentialStoreError> {
        let ring = FileKeyring::open(keyring_dir(config_dir), FILE_PASSPHRASE)?;
        Ok(Self {
            ring: Box::new(ring),
            backend: Backend::File,
        })
    }

    pub fn with_keyring(ring: impl Keyring + 'static) -> Self {
        Self {
            ring: Box::new(ring),
            backend: Backend::Custom,
        }
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Returns the stored token, or `None` when nothing (or an empty value) is stored.
    pub fn get(&self) -> Result<Option<String>, CredentialStoreError> {
        match self.ring.get(AUTH_TOKEN_KEY) {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub fn set(&self, token: &str) -> Result<(), CredentialStoreError> {
        self.ring.set(AUTH_TOKEN_KEY, AUTH_TOKEN_LABEL, token)
    }

    /// Removes the stored token. Returns whether a token was present.
    pub fn delete(&self) -> Result<bool, CredentialStoreError> {
        match self.ring.delete(AUTH_TOKEN_KEY) {
            Ok(()) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }
}
