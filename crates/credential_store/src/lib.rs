//! Credential persistence for the lstk auth token.
//!
//! [`CredentialStore`] owns the backend selection policy: the OS-native keyring is preferred,
//! and an encrypted file store under the configuration directory is used when the OS store
//! cannot be opened or when the file backend is forced via [`BackendPreference::File`].
//! Backends implement the [`Keyring`] primitive; a missing key is reported as
//! [`CredentialStoreError::NotFound`] and absorbed by the store.

mod backend;
mod crypto;
mod error;
mod file;
mod os;
mod paths;
mod store;

pub use backend::Keyring;
pub use error::CredentialStoreError;
pub use file::FileKeyring;
pub use os::OsKeyring;
pub use paths::{keyring_dir, record_file_name, KEYRING_DIR_NAME};
pub use store::{
    Backend, BackendPreference, CredentialStore, AUTH_TOKEN_KEY, AUTH_TOKEN_LABEL,
    FILE_PASSPHRASE, SERVICE_NAME,
};
