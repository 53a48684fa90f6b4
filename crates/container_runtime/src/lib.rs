//! Container engine access for lstk.
//!
//! [`Runtime`] is the capability the startup pipeline drives; [`DockerRuntime`] implements
//! it against the local Docker daemon.

pub mod docker;
pub mod error;
pub mod lines;
pub mod runtime;
pub mod spec;

pub use docker::DockerRuntime;
pub use error::RuntimeError;
pub use lines::LineBuffer;
pub use runtime::Runtime;
pub use spec::{ContainerSpec, PullProgress};
