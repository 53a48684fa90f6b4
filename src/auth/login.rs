//! Interactive login: a browser callback raced against device-code confirmation.

use std::net::SocketAddr;

use platform_api::{AuthRequest, PlatformApi};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::browser::BrowserOpener;
use super::callback::CallbackServer;
use super::error::AuthError;
use crate::output::{InputOption, InputResponse, Sink, SinkExt};

pub const ENTER_KEY: &str = "enter";

pub(crate) struct LoginFlow<'a> {
    pub platform: &'a dyn PlatformApi,
    pub sink: &'a dyn Sink,
    pub browser: &'a dyn BrowserOpener,
    pub web_app_url: &'a str,
    pub callback_addr: SocketAddr,
}

impl LoginFlow<'_> {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<String, AuthError> {
        let mut server = CallbackServer::bind(self.callback_addr).await?;
        let result = self.race(&mut server, cancel).await;
        server.shutdown().await;
        result
    }

    async fn race(
        &self,
        server: &mut CallbackServer,
        cancel: &CancellationToken,
    ) -> Result<String, AuthError> {
        let request = tokio::select! {
            _ = cancel.cancelled() => return Err(AuthError::Cancelled),
            request = self.platform.create_auth_request() => request?,
        };

        self.sink
            .secondary("Open the following URL in your browser to authorize this device:");
        self.sink.highlight(format!(
            "{}/auth/request/{}",
            self.web_app_url, request.id
        ));
        self.sink.info(format!("Verification code: {}", request.code));

        let open_browser = self.sink.request_input(
            "Open browser now?",
            vec![InputOption::new("y", "Y"), InputOption::new("n", "n")],
        );
        let answer = await_reply(open_browser, cancel).await?;
        if answer.selected_key.eq_ignore_ascii_case("y") {
            let login_url = format!("{}/redirect?name=CLI", self.web_app_url);
            if let Err(error) = self.browser.open(&login_url) {
                tracing::debug!(%error, "browser launch failed");
                self.sink
                    .warning(format!("could not open browser, open {login_url} manually"));
            }
        }

        let mut completed = self.sink.request_input(
            "Waiting for authentication...",
            vec![InputOption::new(ENTER_KEY, "Press ENTER when complete")],
        );

        tokio::select! {
            Some(token) = server.tokens.recv() => {
                tracing::debug!("received token from browser callback");
                Ok(token)
            }
            Some(error) = server.errors.recv() => Err(error),
            reply = &mut completed => match reply {
                Ok(response) if !response.cancelled => {
                    tokio::select! {
                        _ = cancel.cancelled() => Err(AuthError::Cancelled),
                        token = self.complete_device_flow(&request) => token,
                    }
                }
                _ => Err(AuthError::Cancelled),
            },
            _ = cancel.cancelled() => Err(AuthError::Cancelled),
        }
    }

    async fn complete_device_flow(&self, request: &AuthRequest) -> Result<String, AuthError> {
        self.sink.info("Checking if auth request is confirmed...");
        let confirmed = self
            .platform
            .check_auth_request_confirmed(&request.id, &request.exchange_token)
            .await?;
        if !confirmed {
            return Err(AuthError::NotConfirmed);
        }

        self.sink
            .info("Auth request confirmed, exchanging for token...");
        let bearer = self
            .platform
            .exchange_auth_request(&request.id, &request.exchange_token)
            .await?;

        self.sink.info("Fetching license token...");
        Ok(self.platform.get_license_token(&bearer).await?)
    }
}

/// A cancelled answer and a dropped reply channel both end the login.
async fn await_reply(
    reply: oneshot::Receiver<InputResponse>,
    cancel: &CancellationToken,
) -> Result<InputResponse, AuthError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(AuthError::Cancelled),
        reply = reply => match reply {
            Ok(response) if !response.cancelled => Ok(response),
            _ => Err(AuthError::Cancelled),
        },
    }
}
