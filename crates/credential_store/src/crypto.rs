//! Passphrase sealing for file-backed keyring records.
//!
//! The passphrase is fixed and known to the tool, so sealing keeps tokens out of casual
//! disk inspection only. Each record gets its own salt; the AES-256-GCM key is derived with
//! HKDF-SHA256 from passphrase and salt.

use aes_gcm::aead::{Aead, AeadCore, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;

const KEY_SIZE: usize = 32;
pub(crate) const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 32;
const HKDF_INFO: &[u8] = b"lstk-keyring-v1";

pub(crate) struct Sealed {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

pub(crate) fn seal(passphrase: &str, plaintext: &[u8]) -> Result<Sealed, String> {
    let mut salt = vec![0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let cipher = cipher_for(passphrase, &salt)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|error| format!("encryption failed: {error}"))?;

    Ok(Sealed {
        salt,
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Returns `None` when the record does not authenticate under `passphrase`.
pub(crate) fn open(passphrase: &str, sealed: &Sealed) -> Option<Vec<u8>> {
    if sealed.nonce.len() != NONCE_SIZE {
        return None;
    }
    let cipher = cipher_for(passphrase, &sealed.salt).ok()?;
    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .ok()
}

fn cipher_for(passphrase: &str, salt: &[u8]) -> Result<Aes256Gcm, String> {
    let hk = Hkdf::<Sha256>::new(Some(salt), passphrase.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    hk.expand(HKDF_INFO, &mut key)
        .map_err(|_| "key derivation failed".to_string())?;
    Aes256Gcm::new_from_slice(&key).map_err(|error| format!("invalid key: {error}"))
}
