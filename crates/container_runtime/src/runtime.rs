use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::RuntimeError;
use crate::spec::{ContainerSpec, PullProgress};

/// Container engine operations used by lstk.
///
/// Containers are addressed by name or id interchangeably. Progress and log channels are
/// best-effort: a closed receiver never fails the operation.
#[async_trait]
pub trait Runtime: Send + Sync {
    async fn pull_image(
        &self,
        image: &str,
        progress: mpsc::Sender<PullProgress>,
    ) -> Result<(), RuntimeError>;

    /// Creates and starts the container, returning its id.
    async fn start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError>;

    /// Stops and removes the container.
    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;

    async fn remove(&self, name: &str) -> Result<(), RuntimeError>;

    async fn is_running(&self, id: &str) -> Result<bool, RuntimeError>;

    /// Last `tail` lines of combined stdout/stderr.
    async fn logs(&self, id: &str, tail: usize) -> Result<String, RuntimeError>;

    /// Sends each log line to `lines`; with `follow` it keeps streaming until the
    /// container stops or the future is dropped.
    async fn stream_logs(
        &self,
        id: &str,
        follow: bool,
        lines: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError>;

    /// Reads `LOCALSTACK_BUILD_VERSION` from the image environment.
    async fn image_version(&self, image: &str) -> Result<String, RuntimeError>;

    async fn check_health(&self) -> Result<(), RuntimeError>;
}
