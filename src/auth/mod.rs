//! Authentication broker.
//!
//! [`Auth::get_token`] resolves a bearer token from, in order, the credential store, the
//! `LOCALSTACK_AUTH_TOKEN` environment variable, and an interactive login.

mod browser;
mod callback;
mod error;
mod login;

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

use credential_store::CredentialStore;
use platform_api::PlatformApi;
use tokio_util::sync::CancellationToken;

pub use browser::{BrowserOpener, SystemBrowser};
pub use callback::CALLBACK_PATH;
pub use error::AuthError;
pub use login::ENTER_KEY;

use crate::output::{Sink, SinkExt};
use login::LoginFlow;

pub const DEFAULT_CALLBACK_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 45678));

#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub env_token: Option<String>,
    pub web_app_url: String,
    /// Whether a user is present to complete a login.
    pub interactive: bool,
    pub callback_addr: SocketAddr,
}

impl AuthOptions {
    pub fn new(web_app_url: impl Into<String>) -> Self {
        Self {
            env_token: None,
            web_app_url: web_app_url.into().trim_end_matches('/').to_string(),
            interactive: false,
            callback_addr: DEFAULT_CALLBACK_ADDR,
        }
    }

    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        self.env_token = token;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_callback_addr(mut self, addr: SocketAddr) -> Self {
        self.callback_addr = addr;
        self
    }
}

pub struct Auth {
    store: CredentialStore,
    platform: Arc<dyn PlatformApi>,
    sink: Arc<dyn Sink>,
    browser: Arc<dyn BrowserOpener>,
    options: AuthOptions,
}

impl Auth {
    pub fn new(
        store: CredentialStore,
        platform: Arc<dyn PlatformApi>,
        sink: Arc<dyn Sink>,
        options: AuthOptions,
    ) -> Self {
        Self {
            store,
            platform,
            sink,
            browser: Arc::new(SystemBrowser),
            options,
        }
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserOpener>) -> Self {
        self.browser = browser;
        self
    }

    pub async fn get_token(&self, cancel: &CancellationToken) -> Result<String, AuthError> {
        match self.store.get() {
            Ok(Some(token)) => return Ok(token),
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "reading stored token failed, ignoring it"),
        }

        if let Some(token) = self
            .options
            .env_token
            .as_deref()
            .filter(|token| !token.is_empty())
        {
            tracing::debug!("using token from environment");
            return Ok(token.to_string());
        }

        if !self.options.interactive {
            return Err(AuthError::NotAuthenticated);
        }
        self.login(cancel).await
    }

    /// Runs the interactive login and persists the resulting token.
    pub async fn login(&self, cancel: &CancellationToken) -> Result<String, AuthError> {
        let flow = LoginFlow {
            platform: self.platform.as_ref(),
            sink: self.sink.as_ref(),
            browser: self.browser.as_ref(),
            web_app_url: &self.options.web_app_url,
            callback_addr: self.options.callback_addr,
        };
        let token = flow.run(cancel).await?;

        if let Err(error) = self.store.set(&token) {
            self.sink
                .warning(format!("could not store token in keyring: {error}"));
        }
        self.sink.success("Login successful.");
        Ok(token)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        if self.store.delete().map_err(AuthError::Logout)? {
            self.sink.success("Logged out successfully.");
        } else {
            self.sink.note("Not currently logged in.");
        }
        Ok(())
    }
}
