use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use container_runtime::{ContainerSpec, PullProgress, Runtime};
use platform_api::{CredentialsInfo, LicenseRequest, MachineInfo, PlatformApi, ProductInfo};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::StartError;
use super::health::{await_ready, cancellable, health_client, HEALTH_POLL_INTERVAL};
use crate::env::AUTH_TOKEN_VAR;
use crate::output::{ErrorEvent, Phase, Progress, SilentError, Sink, SinkExt};
use crate::ports::is_port_in_use;

const PULL_PROGRESS_BUFFER: usize = 64;

/// Brings a batch of containers up in five ordered phases: selection, pull, license,
/// start and health. Each phase covers the whole batch before the next begins.
pub struct StartPipeline {
    runtime: Arc<dyn Runtime>,
    platform: Arc<dyn PlatformApi>,
    sink: Arc<dyn Sink>,
    config_path: Option<PathBuf>,
    machine: MachineInfo,
    poll_interval: Duration,
}

impl StartPipeline {
    pub fn new(
        runtime: Arc<dyn Runtime>,
        platform: Arc<dyn PlatformApi>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            runtime,
            platform,
            sink,
            config_path: None,
            machine: crate::machine::current(),
            poll_interval: HEALTH_POLL_INTERVAL,
        }
    }

    /// Config file named in the port conflict hint.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_machine(mut self, machine: MachineInfo) -> Self {
        self.machine = machine;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub async fn start(
        &self,
        cancel: &CancellationToken,
        token: &str,
        specs: Vec<ContainerSpec>,
    ) -> Result<(), StartError> {
        self.check_runtime(cancel).await?;

        let pending = self.select(specs, cancel).await?;
        if pending.is_empty() {
            return Ok(());
        }

        for spec in &pending {
            self.pull(spec, cancel).await?;
        }

        for spec in &pending {
            self.validate_license(spec, token, cancel).await?;
        }

        let mut started = Vec::with_capacity(pending.len());
        for spec in pending {
            let id = self.start_one(spec.clone(), token, cancel).await?;
            started.push((spec, id));
        }

        let http = health_client()?;
        for (spec, id) in &started {
            self.sink.status(Phase::Waiting, &spec.name, None);
            await_ready(
                self.runtime.as_ref(),
                &http,
                spec,
                id,
                self.poll_interval,
                cancel,
            )
            .await?;
            let short_id: String = id.chars().take(12).collect();
            self.sink.status(Phase::Ready, &spec.name, Some(short_id));
        }
        Ok(())
    }

    async fn check_runtime(&self, cancel: &CancellationToken) -> Result<(), StartError> {
        if let Err(error) = cancellable(cancel, self.runtime.check_health()).await? {
            tracing::debug!(%error, "container runtime health check failed");
            self.sink.error(
                ErrorEvent::new("Docker is not available")
                    .with_summary(error.to_string())
                    .with_action("Start Docker:", start_docker_hint())
                    .with_action("Install Docker:", "https://docs.docker.com/get-docker/"),
            );
            return Err(StartError::RuntimeUnhealthy(SilentError::new(error)));
        }
        Ok(())
    }

    /// Drops containers that already run and fails on the first occupied port.
    async fn select(
        &self,
        specs: Vec<ContainerSpec>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContainerSpec>, StartError> {
        let mut pending = Vec::with_capacity(specs.len());
        for spec in specs {
            let running = match cancellable(cancel, self.runtime.is_running(&spec.name)).await? {
                Ok(running) => running,
                Err(error) if error.is_not_found() => false,
                Err(source) => {
                    return Err(StartError::Inspect {
                        name: spec.name,
                        source,
                    })
                }
            };
            if running {
                self.sink.note(format!("{} is already running", spec.name));
                continue;
            }
            pending.push(spec);
        }

        for spec in &pending {
            if cancellable(cancel, is_port_in_use(spec.port)).await? {
                return Err(StartError::PortInUse {
                    port: spec.port,
                    hint: self.port_hint(),
                });
            }
        }
        Ok(pending)
    }

    fn port_hint(&self) -> String {
        match &self.config_path {
            Some(path) => format!(
                "Stop the process using it or change the port in {}",
                path.display()
            ),
            None => "Stop the process using it or configure another port".to_string(),
        }
    }

    async fn pull(
        &self,
        spec: &ContainerSpec,
        cancel: &CancellationToken,
    ) -> Result<(), StartError> {
        match cancellable(cancel, self.runtime.remove(&spec.name)).await? {
            Ok(()) => tracing::debug!(name = %spec.name, "removed stale container"),
            Err(error) if error.is_not_found() => {}
            Err(source) => {
                return Err(StartError::RemoveStale {
                    name: spec.name.clone(),
                    source,
                })
            }
        }

        self.sink.status(Phase::Pulling, &spec.name, None);
        let (tx, mut rx) = mpsc::channel::<PullProgress>(PULL_PROGRESS_BUFFER);
        let pull = self.runtime.pull_image(&spec.image, tx);
        let forward = async {
            while let Some(update) = rx.recv().await {
                self.sink.progress(Progress {
                    container: spec.name.clone(),
                    layer_id: update.layer_id,
                    status: update.status,
                    current: update.current,
                    total: update.total,
                });
            }
        };

        let (pulled, ()) = cancellable(cancel, async { tokio::join!(pull, forward) }).await?;
        pulled.map_err(|source| StartError::Pull {
            image: spec.image.clone(),
            source,
        })
    }

    async fn validate_license(
        &self,
        spec: &ContainerSpec,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<(), StartError> {
        let version = match spec.pinned_version() {
            Some(version) => version.to_string(),
            None => cancellable(cancel, self.runtime.image_version(&spec.image))
                .await?
                .map_err(|source| StartError::Version {
                    image: spec.image.clone(),
                    source,
                })?,
        };

        let request = LicenseRequest {
            product: ProductInfo {
                name: spec.product.clone(),
                version: version.clone(),
            },
            credentials: CredentialsInfo {
                token: token.to_string(),
            },
            machine: self.machine.clone(),
        };
        cancellable(cancel, self.platform.get_license(&request))
            .await?
            .map_err(|source| StartError::License {
                product: spec.product.clone(),
                version,
                source,
            })?;
        tracing::info!(product = %spec.product, "license validated");
        Ok(())
    }

    async fn start_one(
        &self,
        mut spec: ContainerSpec,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<String, StartError> {
        self.sink.status(Phase::Starting, &spec.name, None);
        spec.env.push(format!("{AUTH_TOKEN_VAR}={token}"));
        cancellable(cancel, self.runtime.start(&spec))
            .await?
            .map_err(|source| StartError::Start {
                name: spec.name.clone(),
                source,
            })
    }
}

fn start_docker_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "open -a Docker"
    } else if cfg!(target_os = "windows") {
        "start Docker Desktop"
    } else {
        "sudo systemctl start docker"
    }
}
