use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.localstack.cloud";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport configuration for platform API requests.
#[derive(Debug, Clone)]
pub struct PlatformApiConfig {
    /// Scheme and host of the platform API, without a trailing `/v1`.
    pub base_url: String,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Duration,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl Default for PlatformApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl PlatformApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
