//! Local listener the web app redirects to after a browser login.

use std::net::SocketAddr;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::error::AuthError;

pub const CALLBACK_PATH: &str = "/auth/success";

#[derive(Clone)]
struct CallbackState {
    tokens: mpsc::Sender<String>,
    errors: mpsc::Sender<AuthError>,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    token: Option<String>,
}

/// Running callback listener. Dropping it stops the server.
pub(crate) struct CallbackServer {
    pub tokens: mpsc::Receiver<String>,
    pub errors: mpsc::Receiver<AuthError>,
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CallbackServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AuthError::CallbackBind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| AuthError::CallbackBind { addr, source })?;

        let (token_tx, tokens) = mpsc::channel(1);
        let (error_tx, errors) = mpsc::channel(1);
        let state = CallbackState {
            tokens: token_tx,
            errors: error_tx.clone(),
        };
        let router = Router::new()
            .route(CALLBACK_PATH, get(handle_success))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = served {
                let _ = error_tx.try_send(AuthError::CallbackServer(error));
            }
        });
        tracing::debug!(%local_addr, "login callback listener started");

        Ok(Self {
            tokens,
            errors,
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::debug!(local_addr = %self.local_addr, "login callback listener stopped");
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn handle_success(
    State(state): State<CallbackState>,
    Query(query): Query<CallbackQuery>,
) -> (StatusCode, &'static str) {
    match query.token.filter(|token| !token.is_empty()) {
        Some(token) => {
            let _ = state.tokens.try_send(token);
            (StatusCode::OK, "")
        }
        None => {
            let _ = state.errors.try_send(AuthError::CallbackMissingToken);
            (StatusCode::BAD_REQUEST, "No token received")
        }
    }
}
