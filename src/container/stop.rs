use container_runtime::Runtime;

use super::error::StopError;
use crate::output::{Sink, SinkExt};

/// Stops and removes each named container in order, failing on the first error.
pub async fn stop(
    runtime: &dyn Runtime,
    sink: &dyn Sink,
    names: &[String],
) -> Result<(), StopError> {
    for name in names {
        sink.info(format!("Stopping {name}..."));
        match runtime.stop(name).await {
            Ok(()) => sink.info(format!("{name} stopped")),
            Err(error) if error.is_not_found() => {
                return Err(StopError::NotRunning { name: name.clone() })
            }
            Err(source) => {
                return Err(StopError::Failed {
                    name: name.clone(),
                    source,
                })
            }
        }
    }
    Ok(())
}
