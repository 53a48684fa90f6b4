use std::io;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE_NAME: &str = "lstk.toml";
pub const USER_CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR_NAME: &str = "lstk";

/// Directories consulted when locating the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocations {
    /// Directory searched for a project-local `lstk.toml`.
    pub working_dir: PathBuf,
    /// `$HOME/.config`, whether or not it exists.
    pub home_config_dir: Option<PathBuf>,
    /// Platform config directory (`~/Library/Application Support`, `%APPDATA%`, ...).
    pub os_config_dir: Option<PathBuf>,
}

impl ConfigLocations {
    pub fn detect() -> io::Result<Self> {
        Ok(Self {
            working_dir: std::env::current_dir()?,
            home_config_dir: dirs::home_dir().map(|home| home.join(".config")),
            os_config_dir: dirs::config_dir(),
        })
    }

    /// Candidate files in priority order: project-local, XDG-style home, platform.
    #[must_use]
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.working_dir.join(LOCAL_CONFIG_FILE_NAME)];
        if let Some(dir) = &self.home_config_dir {
            paths.push(dir.join(APP_DIR_NAME).join(USER_CONFIG_FILE_NAME));
        }
        if let Some(dir) = &self.os_config_dir {
            paths.push(dir.join(APP_DIR_NAME).join(USER_CONFIG_FILE_NAME));
        }
        paths
    }

    pub fn first_existing(&self) -> io::Result<Option<PathBuf>> {
        for path in self.search_paths() {
            match std::fs::metadata(&path) {
                Ok(_) => return Ok(Some(path)),
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => return Err(error),
            }
        }
        Ok(None)
    }

    /// Directory a fresh config file is written to: `~/.config/lstk` when `~/.config`
    /// already exists, else the platform directory.
    #[must_use]
    pub fn creation_dir(&self) -> Option<PathBuf> {
        match &self.home_config_dir {
            Some(dir) if dir.is_dir() => Some(dir.join(APP_DIR_NAME)),
            _ => self
                .os_config_dir
                .as_ref()
                .or(self.home_config_dir.as_ref())
                .map(|dir| dir.join(APP_DIR_NAME)),
        }
    }

    /// The file that is (or would be) used, without touching the filesystem beyond stats.
    pub fn resolve_path(&self) -> io::Result<Option<PathBuf>> {
        if let Some(existing) = self.first_existing()? {
            return Ok(Some(existing));
        }
        Ok(self
            .creation_dir()
            .map(|dir| dir.join(USER_CONFIG_FILE_NAME)))
    }
}

/// Directory holding `path`, used as the root for the file keyring.
#[must_use]
pub fn config_dir_of(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{ConfigLocations, LOCAL_CONFIG_FILE_NAME};

    fn locations(root: &std::path::Path) -> ConfigLocations {
        ConfigLocations {
            working_dir: root.join("project"),
            home_config_dir: Some(root.join("home").join(".config")),
            os_config_dir: Some(root.join("os")),
        }
    }

    #[test]
    fn local_file_wins_over_user_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locations = locations(dir.path());
        fs::create_dir_all(&locations.working_dir).expect("project dir");
        fs::create_dir_all(dir.path().join("os").join("lstk")).expect("os dir");
        fs::write(locations.working_dir.join(LOCAL_CONFIG_FILE_NAME), "").expect("local file");
        fs::write(dir.path().join("os/lstk/config.toml"), "").expect("os file");

        assert_eq!(
            locations.first_existing().expect("stat"),
            Some(locations.working_dir.join(LOCAL_CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn creation_prefers_existing_home_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locations = locations(dir.path());

        assert_eq!(
            locations.creation_dir(),
            Some(dir.path().join("os").join("lstk"))
        );

        fs::create_dir_all(dir.path().join("home").join(".config")).expect("home config");
        assert_eq!(
            locations.creation_dir(),
            Some(dir.path().join("home").join(".config").join("lstk"))
        );
    }

    #[test]
    fn resolve_path_falls_back_to_creation_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locations = locations(dir.path());

        assert_eq!(
            locations.resolve_path().expect("resolve"),
            Some(dir.path().join("os").join("lstk").join("config.toml"))
        );
    }
}
