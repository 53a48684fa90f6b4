//! Orchestration core of the `lstk` command-line tool.
//!
//! The same logic drives a plain line printer and an interactive terminal UI: every stage
//! reports through an [`output::Sink`] chosen by the caller before work starts.
//!
//! # Flow
//! - [`auth::Auth::get_token`] resolves a bearer token: credential store, then
//!   `LOCALSTACK_AUTH_TOKEN`, then an interactive login that races a browser callback
//!   against device-code confirmation.
//! - [`container::StartPipeline::start`] brings the configured emulators up in five ordered
//!   phases: selection, pull, license, start, health.
//!
//! Collaborators sit behind traits from sibling crates: [`container_runtime::Runtime`],
//! [`platform_api::PlatformApi`] and [`credential_store::Keyring`].

pub mod auth;
pub mod config;
pub mod container;
pub mod env;
pub mod machine;
pub mod output;
pub mod ports;
