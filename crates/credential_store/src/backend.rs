use crate::error::CredentialStoreError;

/// Secret storage primitive keyed by name.
///
/// Implementations report a missing key as [`CredentialStoreError::NotFound`] from both
/// `get` and `delete`; translating that into "absent" is the caller's policy.
pub trait Keyring: Send + Sync {
    fn get(&self, key: &str) -> Result<String, CredentialStoreError>;

    fn set(&self, key: &str, label: &str, secret: &str) -> Result<(), CredentialStoreError>;

    fn delete(&self, key: &str) -> Result<(), CredentialStoreError>;
}

impl<T: Keyring + ?Sized> Keyring for Box<T> {
    fn get(&self, key: &str) -> Result<String, CredentialStoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, label: &str, secret: &str) -> Result<(), CredentialStoreError> {
        (**self).set(key, label, secret)
    }

    fn delete(&self, key: &str) -> Result<(), CredentialStoreError> {
        (**self).delete(key)
    }
}
