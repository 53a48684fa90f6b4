use container_runtime::Runtime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::LogsError;
use crate::output::{Sink, SinkExt};

const LOG_LINE_BUFFER: usize = 256;

/// Streams the container's log as one [`crate::output::Event::ContainerLogLine`] per line.
///
/// Cancellation ends a followed stream normally.
pub async fn logs(
    runtime: &dyn Runtime,
    sink: &dyn Sink,
    name: &str,
    follow: bool,
    cancel: &CancellationToken,
) -> Result<(), LogsError> {
    let running = match runtime.is_running(name).await {
        Ok(running) => running,
        Err(error) if error.is_not_found() => false,
        Err(source) => {
            return Err(LogsError::Runtime {
                name: name.to_string(),
                source,
            })
        }
    };
    if !running {
        return Err(LogsError::NotRunning);
    }

    let (tx, mut rx) = mpsc::channel::<String>(LOG_LINE_BUFFER);
    let stream = runtime.stream_logs(name, follow, tx);
    let forward = async {
        while let Some(line) = rx.recv().await {
            sink.log_line(line);
        }
    };

    let streamed = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        (streamed, ()) = async { tokio::join!(stream, forward) } => streamed,
    };
    streamed.map_err(|source| match source {
        source if source.is_not_found() => LogsError::NotRunning,
        source => LogsError::Runtime {
            name: name.to_string(),
            source,
        },
    })
}
