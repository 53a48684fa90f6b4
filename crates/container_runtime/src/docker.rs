use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{CreateImageInfo, HostConfig, PortBinding};
use bollard::Docker;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::RuntimeError;
use crate::lines::LineBuffer;
use crate::runtime::Runtime;
use crate::spec::{ContainerSpec, PullProgress};

const BUILD_VERSION_PREFIX: &str = "LOCALSTACK_BUILD_VERSION=";

/// [`Runtime`] over the local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects using `DOCKER_HOST` or the platform default socket.
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults().map_err(RuntimeError::Unavailable)?;
        Ok(Self { docker })
    }

    async fn collect_logs(
        &self,
        id: &str,
        options: LogsOptions<String>,
    ) -> Result<String, RuntimeError> {
        let mut stream = Box::pin(self.docker.logs(id, Some(options)));
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|source| RuntimeError::docker("read container logs", id, source))?;
            out.push_str(&String::from_utf8_lossy(&chunk.into_bytes()));
        }
        Ok(out)
    }
}

#[async_trait]
impl Runtime for DockerRuntime {
    async fn pull_image(
        &self,
        image: &str,
        progress: mpsc::Sender<PullProgress>,
    ) -> Result<(), RuntimeError> {
        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };
        let stream = Box::pin(self.docker.create_image(Some(options), None, None));
        forward_pull_progress(image, stream, &progress).await?;
        tracing::debug!(image, "image pull finished");
        Ok(())
    }

    async fn start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };
        let created = self
            .docker
            .create_container(Some(options), container_config(spec))
            .await
            .map_err(|source| RuntimeError::docker("create container", &spec.name, source))?;

        self.docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|source| RuntimeError::docker("start container", &spec.name, source))?;

        tracing::info!(name = %spec.name, id = %created.id, "container started");
        Ok(created.id)
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        self.docker
            .stop_container(name, None::<StopContainerOptions>)
            .await
            .map_err(|source| RuntimeError::docker("stop container", name, source))?;
        self.remove(name).await
    }

    async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        self.docker
            .remove_container(name, None::<RemoveContainerOptions>)
            .await
            .map_err(|source| RuntimeError::docker("remove container", name, source))
    }

    async fn is_running(&self, id: &str) -> Result<bool, RuntimeError> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|source| RuntimeError::docker("inspect container", id, source))?;
        Ok(inspect
            .state
            .and_then(|state| state.running)
            .unwrap_or(false))
    }

    async fn logs(&self, id: &str, tail: usize) -> Result<String, RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        self.collect_logs(id, options).await
    }

    async fn stream_logs(
        &self,
        id: &str,
        follow: bool,
        lines: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow,
            tail: "all".to_string(),
            ..Default::default()
        };
        let stream = Box::pin(self.docker.logs(id, Some(options)));
        forward_log_lines(id, stream, &lines).await
    }

    async fn image_version(&self, image: &str) -> Result<String, RuntimeError> {
        let inspect = self
            .docker
            .inspect_image(image)
            .await
            .map_err(|source| RuntimeError::docker("inspect image", image, source))?;
        let env = inspect
            .config
            .and_then(|config| config.env)
            .unwrap_or_default();
        build_version(&env).ok_or(RuntimeError::VersionNotFound)
    }

    async fn check_health(&self) -> Result<(), RuntimeError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(RuntimeError::Unavailable)
    }
}

async fn forward_pull_progress<S>(
    image: &str,
    mut stream: S,
    progress: &mpsc::Sender<PullProgress>,
) -> Result<(), RuntimeError>
where
    S: Stream<Item = Result<CreateImageInfo, bollard::errors::Error>> + Unpin,
{
    while let Some(item) = stream.next().await {
        let info = match item {
            Ok(info) => info,
            Err(bollard::errors::Error::DockerStreamError { error }) => {
                return Err(RuntimeError::PullFailed(error));
            }
            Err(source) => return Err(RuntimeError::docker("pull image", image, source)),
        };
        let update = pull_progress(info)?;
        // A dropped receiver only means nobody is watching.
        let _ = progress.send(update).await;
    }
    Ok(())
}

async fn forward_log_lines<S>(
    id: &str,
    mut stream: S,
    lines: &mpsc::Sender<String>,
) -> Result<(), RuntimeError>
where
    S: Stream<Item = Result<LogOutput, bollard::errors::Error>> + Unpin,
{
    let mut buffer = LineBuffer::default();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|source| RuntimeError::docker("stream container logs", id, source))?;
        for line in buffer.push(&String::from_utf8_lossy(&chunk.into_bytes())) {
            if lines.send(line).await.is_err() {
                return Ok(());
            }
        }
    }
    if let Some(rest) = buffer.finish() {
        let _ = lines.send(rest).await;
    }
    Ok(())
}

fn pull_progress(info: CreateImageInfo) -> Result<PullProgress, RuntimeError> {
    if let Some(error) = info.error.filter(|error| !error.is_empty()) {
        return Err(RuntimeError::PullFailed(error));
    }
    let detail = info.progress_detail.unwrap_or_default();
    Ok(PullProgress {
        layer_id: info.id.unwrap_or_default(),
        status: info.status.unwrap_or_default(),
        current: detail.current.unwrap_or(0),
        total: detail.total.unwrap_or(0),
    })
}

fn container_config(spec: &ContainerSpec) -> Config<String> {
    let port_key = format!("{}/tcp", spec.port);
    let exposed_ports = HashMap::from([(port_key.clone(), HashMap::new())]);
    let port_bindings = HashMap::from([(
        port_key,
        Some(vec![PortBinding {
            host_ip: None,
            host_port: Some(spec.port.to_string()),
        }]),
    )]);

    Config {
        image: Some(spec.image.clone()),
        env: Some(spec.env.clone()),
        exposed_ports: Some(exposed_ports),
        host_config: Some(HostConfig {
            port_bindings: Some(port_bindings),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_version(env: &[String]) -> Option<String> {
    env.iter()
        .find_map(|entry| entry.strip_prefix(BUILD_VERSION_PREFIX))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use bollard::models::{CreateImageInfo, ProgressDetail};
    use futures_util::stream;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::{
        build_version, container_config, forward_pull_progress, pull_progress, RuntimeError,
    };
    use crate::spec::{ContainerSpec, PullProgress};

    fn spec() -> ContainerSpec {
        ContainerSpec {
            image: "localstack/localstack-pro:latest".to_string(),
            name: "localstack-aws".to_string(),
            port: 4566,
            health_path: "/_localstack/health".to_string(),
            env: vec!["DEBUG=1".to_string(), "LOCALSTACK_AUTH_TOKEN=ls-abc".to_string()],
            product: "localstack-pro".to_string(),
            tag: "latest".to_string(),
        }
    }

    fn layer(id: &str, status: &str, current: i64, total: i64) -> CreateImageInfo {
        CreateImageInfo {
            id: Some(id.to_string()),
            status: Some(status.to_string()),
            progress_detail: Some(ProgressDetail {
                current: Some(current),
                total: Some(total),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn progress_detail_defaults_to_zero() {
        let info = CreateImageInfo {
            status: Some("Pulling fs layer".to_string()),
            ..Default::default()
        };
        assert_eq!(
            pull_progress(info).expect("progress decodes"),
            PullProgress {
                status: "Pulling fs layer".to_string(),
                ..PullProgress::default()
            }
        );
    }

    #[test]
    fn error_field_fails_the_pull() {
        let info = CreateImageInfo {
            error: Some("manifest unknown".to_string()),
            ..Default::default()
        };
        let error = pull_progress(info).expect_err("error field must fail");
        assert_eq!(error.to_string(), "image pull failed: manifest unknown");
    }

    #[tokio::test]
    async fn every_progress_unit_is_forwarded_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let items = stream::iter(vec![
            Ok(layer("a1", "Downloading", 10, 100)),
            Ok(layer("a1", "Download complete", 100, 100)),
        ]);

        forward_pull_progress("img", items, &tx)
            .await
            .expect("pull should succeed");
        drop(tx);

        let mut seen = Vec::new();
        while let Some(update) = rx.recv().await {
            seen.push((update.layer_id, update.status, update.current));
        }
        assert_eq!(
            seen,
            vec![
                ("a1".to_string(), "Downloading".to_string(), 10),
                ("a1".to_string(), "Download complete".to_string(), 100),
            ]
        );
    }

    #[tokio::test]
    async fn stream_error_message_becomes_pull_failure() {
        let (tx, _rx) = mpsc::channel(8);
        let items = stream::iter(vec![Err(bollard::errors::Error::DockerStreamError {
            error: "unauthorized".to_string(),
        })]);

        let error = forward_pull_progress("img", items, &tx)
            .await
            .expect_err("stream error should fail");
        assert!(matches!(
            error,
            RuntimeError::PullFailed(ref message) if message == "unauthorized"
        ));
    }

    #[test]
    fn container_binds_port_to_same_host_port() {
        let config = container_config(&spec());

        assert_eq!(config.image.as_deref(), Some("localstack/localstack-pro:latest"));
        assert_eq!(config.env, Some(spec().env));
        let exposed = config.exposed_ports.expect("exposed ports set");
        assert!(exposed.contains_key("4566/tcp"));
        let bindings = config
            .host_config
            .and_then(|host| host.port_bindings)
            .expect("port bindings set");
        let binding = bindings
            .get("4566/tcp")
            .cloned()
            .flatten()
            .expect("binding for container port");
        assert_eq!(binding[0].host_port.as_deref(), Some("4566"));
    }

    #[test]
    fn build_version_is_read_from_image_env() {
        let env = vec![
            "PATH=/usr/bin".to_string(),
            "LOCALSTACK_BUILD_VERSION=4.1.0".to_string(),
        ];
        assert_eq!(build_version(&env).as_deref(), Some("4.1.0"));
        assert_eq!(build_version(&["PATH=/usr/bin".to_string()]), None);
    }
}
