//! Container lifecycle orchestration over a [`container_runtime::Runtime`].

mod error;
mod health;
mod logs;
mod start;
mod stop;

pub use error::{LogsError, StartError, StopError};
pub use health::{EXIT_LOG_TAIL, HEALTH_POLL_INTERVAL, HEALTH_REQUEST_TIMEOUT};
pub use logs::logs;
pub use start::StartPipeline;
pub use stop::stop;
