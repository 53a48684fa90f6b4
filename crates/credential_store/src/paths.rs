use std::path::{Path, PathBuf};

pub const KEYRING_DIR_NAME: &str = "keyring";

#[must_use]
pub fn keyring_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(KEYRING_DIR_NAME)
}

#[must_use]
pub fn record_file_name(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect();
    format!("{sanitized}.json")
}
