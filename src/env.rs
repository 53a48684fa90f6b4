//! Environment configuration.

use std::env;

pub const AUTH_TOKEN_VAR: &str = "LOCALSTACK_AUTH_TOKEN";
pub const API_ENDPOINT_VAR: &str = "LSTK_API_ENDPOINT";
pub const WEB_APP_URL_VAR: &str = "LSTK_WEB_APP_URL";
pub const KEYRING_VAR: &str = "LSTK_KEYRING";
pub const LOG_VAR: &str = "LSTK_LOG";

pub const DEFAULT_API_ENDPOINT: &str = "https://api.localstack.cloud";
pub const DEFAULT_WEB_APP_URL: &str = "https://app.localstack.cloud";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Shared with other LocalStack tools, hence no `LSTK_` prefix.
    pub auth_token: Option<String>,
    pub api_endpoint: String,
    pub web_app_url: String,
    pub keyring: Option<String>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            auth_token: env_string_opt(AUTH_TOKEN_VAR),
            api_endpoint: env_string_opt(API_ENDPOINT_VAR)
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            web_app_url: env_string_opt(WEB_APP_URL_VAR)
                .unwrap_or_else(|| DEFAULT_WEB_APP_URL.to_string()),
            keyring: env_string_opt(KEYRING_VAR),
            log_filter: env_string_opt(LOG_VAR),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
