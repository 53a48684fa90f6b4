/// Fully resolved, engine-agnostic description of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub name: String,
    pub port: u16,
    pub health_path: String,
    /// `KEY=value` entries passed to the container.
    pub env: Vec<String>,
    /// Product name submitted for license validation.
    pub product: String,
    pub tag: String,
}

impl ContainerSpec {
    /// `http://localhost:{port}{health_path}`
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.health_path)
    }

    /// Version pinned by the tag, if any; `latest` pins nothing.
    #[must_use]
    pub fn pinned_version(&self) -> Option<&str> {
        match self.tag.trim() {
            "" | "latest" => None,
            tag => Some(tag),
        }
    }
}

/// One decoded unit of image pull progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullProgress {
    pub layer_id: String,
    pub status: String,
    pub current: i64,
    pub total: i64,
}
