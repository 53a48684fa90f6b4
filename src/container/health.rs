use std::future::Future;
use std::time::Duration;

use container_runtime::{ContainerSpec, Runtime};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use super::error::StartError;

pub const HEALTH_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Log lines attached to an unexpected-exit error.
pub const EXIT_LOG_TAIL: usize = 20;

pub(crate) fn health_client() -> Result<reqwest::Client, StartError> {
    reqwest::Client::builder()
        .timeout(HEALTH_REQUEST_TIMEOUT)
        .build()
        .map_err(StartError::HealthClient)
}

/// Output of `work`, or [`StartError::Cancelled`] as soon as `cancel` fires.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = T>,
) -> Result<T, StartError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StartError::Cancelled),
        out = work => Ok(out),
    }
}

/// Polls until the health endpoint answers 200 or the container stops.
pub(crate) async fn await_ready(
    runtime: &dyn Runtime,
    http: &reqwest::Client,
    spec: &ContainerSpec,
    id: &str,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<(), StartError> {
    let url = spec.health_url();
    loop {
        let running = cancellable(cancel, runtime.is_running(id)).await?;
        if !running.map_err(StartError::Status)? {
            let logs = match cancellable(cancel, runtime.logs(id, EXIT_LOG_TAIL)).await? {
                Ok(logs) if !logs.trim().is_empty() => Some(logs),
                Ok(_) => None,
                Err(error) => {
                    tracing::debug!(%error, id, "could not read logs of exited container");
                    None
                }
            };
            return Err(StartError::Exited {
                name: spec.name.clone(),
                logs,
            });
        }

        match cancellable(cancel, http.get(&url).send()).await? {
            Ok(response) if response.status() == StatusCode::OK => return Ok(()),
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), %url, "not healthy yet");
            }
            Err(error) => tracing::debug!(%error, %url, "health probe failed"),
        }

        cancellable(cancel, tokio::time::sleep(interval)).await?;
    }
}
