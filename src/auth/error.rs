use std::io;
use std::net::SocketAddr;

use credential_store::CredentialStoreError;
use platform_api::PlatformApiError;
use thiserror::Error;

use crate::env::AUTH_TOKEN_VAR;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "not authenticated: set {AUTH_TOKEN_VAR} or run `lstk login` in an interactive terminal"
    )]
    NotAuthenticated,

    /// The user or the caller aborted the login; never wrapped.
    #[error("login cancelled")]
    Cancelled,

    #[error("auth request not confirmed - please enter the code in the browser first")]
    NotConfirmed,

    #[error("failed to start callback server on {addr}: {source}")]
    CallbackBind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("no token in callback")]
    CallbackMissingToken,

    #[error("callback server error: {0}")]
    CallbackServer(#[source] io::Error),

    #[error("login failed: {0}")]
    Platform(#[from] PlatformApiError),

    #[error("failed to remove stored token: {0}")]
    Logout(#[source] CredentialStoreError),
}

impl AuthError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
