use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::backend::Keyring;
use crate::crypto::{self, Sealed};
use crate::error::CredentialStoreError;
use crate::paths::record_file_name;

const RECORD_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct KeyringRecord {
    version: u32,
    label: String,
    saved_at: String,
    salt: String,
    nonce: String,
    ciphertext: String,
}

/// Keyring backed by one sealed JSON record per key inside a private directory.
#[derive(Debug, Clone)]
pub struct FileKeyring {
    dir: PathBuf,
    passphrase: String,
}

impl FileKeyring {
    pub fn open(
        dir: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Result<Self, CredentialStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| {
            CredentialStoreError::io("creating keyring directory", &dir, source)
        })?;
        restrict_permissions(&dir, 0o700)?;

        Ok(Self {
            dir,
            passphrase: passphrase.into(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(record_file_name(key))
    }

    fn read_record(&self, key: &str) -> Result<(PathBuf, KeyringRecord), CredentialStoreError> {
        let path = self.record_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialStoreError::not_found(key));
            }
            Err(source) => {
                return Err(CredentialStoreError::io("reading keyring record", &path, source));
            }
        };

        let record = serde_json::from_str::<KeyringRecord>(&raw).map_err(|source| {
            CredentialStoreError::RecordParse {
                path: path.clone(),
                source,
            }
        })?;
        if record.version != RECORD_VERSION {
            return Err(CredentialStoreError::UnsupportedVersion {
                path,
                found: record.version,
            });
        }

        Ok((path, record))
    }
}

impl Keyring for FileKeyring {
    fn get(&self, key: &str) -> Result<String, CredentialStoreError> {
        let (path, record) = self.read_record(key)?;
        let sealed = Sealed {
            salt: decode_field(&path, "salt", &record.salt)?,
            nonce: decode_field(&path, "nonce", &record.nonce)?,
            ciphertext: decode_field(&path, "ciphertext", &record.ciphertext)?,
        };

        let plaintext = crypto::open(&self.passphrase, &sealed)
            .ok_or_else(|| CredentialStoreError::Decrypt { path: path.clone() })?;
        String::from_utf8(plaintext)
            .map_err(|_| CredentialStoreError::corrupt(path, "decrypted secret is not UTF-8"))
    }

    fn set(&self, key: &str, label: &str, secret: &str) -> Result<(), CredentialStoreError> {
        let sealed = crypto::seal(&self.passphrase, secret.as_bytes())
            .map_err(CredentialStoreError::Encrypt)?;
        let saved_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(CredentialStoreError::ClockFormat)?;
        let record = KeyringRecord {
            version: RECORD_VERSION,
            label: label.to_string(),
            saved_at,
            salt: STANDARD.encode(&sealed.salt),
            nonce: STANDARD.encode(&sealed.nonce),
            ciphertext: STANDARD.encode(&sealed.ciphertext),
        };

        let path = self.record_path(key);
        let body = serde_json::to_vec_pretty(&record).map_err(|source| {
            CredentialStoreError::RecordSerialize {
                path: path.clone(),
                source,
            }
        })?;
        write_private(&path, &body)?;
        tracing::debug!(path = %path.display(), "stored sealed keyring record");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialStoreError> {
        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(CredentialStoreError::not_found(key))
            }
            Err(source) => Err(CredentialStoreError::io(
                "removing keyring record",
                &path,
                source,
            )),
        }
    }
}

fn decode_field(path: &Path, field: &str, value: &str) -> Result<Vec<u8>, CredentialStoreError> {
    STANDARD
        .decode(value)
        .map_err(|error| CredentialStoreError::corrupt(path, format!("field '{field}': {error}")))
}

/// Writes through a sibling temp file so a crash never leaves a truncated record.
fn write_private(path: &Path, body: &[u8]) -> Result<(), CredentialStoreError> {
    let tmp_path = path.with_extension("json.tmp");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path).map_err(|source| {
        CredentialStoreError::io("creating keyring record", &tmp_path, source)
    })?;
    file.write_all(body)
        .and_then(|()| file.sync_all())
        .map_err(|source| {
            CredentialStoreError::io("writing keyring record", &tmp_path, source)
        })?;
    drop(file);

    fs::rename(&tmp_path, path)
        .map_err(|source| CredentialStoreError::io("replacing keyring record", path, source))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<(), CredentialStoreError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|source| CredentialStoreError::io("restricting permissions", path, source))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<(), CredentialStoreError> {
    Ok(())
}
