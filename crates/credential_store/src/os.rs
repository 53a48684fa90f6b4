use keyring::Entry;

use crate::backend::Keyring;
use crate::error::CredentialStoreError;

const PROBE_KEY: &str = "lstk.availability-probe";

/// Keyring backed by the platform credential store.
///
/// macOS uses the Keychain and Windows the Credential Manager. On Linux keyutils caches
/// entries in front of the Secret Service, which holds them across reboots.
#[derive(Debug, Clone)]
pub struct OsKeyring {
    service: String,
}

impl OsKeyring {
    /// Opens the platform store for `service`.
    ///
    /// A lookup of a probe key is performed up front so an inaccessible store (no daemon,
    /// sandboxed process, unsupported platform) is reported here rather than on first use.
    pub fn open(service: impl Into<String>) -> Result<Self, CredentialStoreError> {
        let ring = Self {
            service: service.into(),
        };
        let probe =
            Entry::new(&ring.service, PROBE_KEY).map_err(CredentialStoreError::Unavailable)?;
        match probe.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(ring),
            Err(error) => Err(CredentialStoreError::Unavailable(error)),
        }
    }

    fn entry(&self, key: &str, operation: &'static str) -> Result<Entry, CredentialStoreError> {
        Entry::new(&self.service, key)
            .map_err(|source| CredentialStoreError::Os { operation, source })
    }
}

impl Keyring for OsKeyring {
    fn get(&self, key: &str) -> Result<String, CredentialStoreError> {
        match self.entry(key, "reading credential")?.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(CredentialStoreError::not_found(key)),
            Err(source) => Err(CredentialStoreError::Os {
                operation: "reading credential",
                source,
            }),
        }
    }

    // The platform stores have no separate label slot for this API; the key names the item.
    fn set(&self, key: &str, _label: &str, secret: &str) -> Result<(), CredentialStoreError> {
        self.entry(key, "storing credential")?
            .set_password(secret)
            .map_err(|source| CredentialStoreError::Os {
                operation: "storing credential",
                source,
            })
    }

    fn delete(&self, key: &str) -> Result<(), CredentialStoreError> {
        match self.entry(key, "deleting credential")?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(CredentialStoreError::not_found(key)),
            Err(source) => Err(CredentialStoreError::Os {
                operation: "deleting credential",
                source,
            }),
        }
    }
}
