//! HTTP client for the LocalStack platform API.
//!
//! Covers the device-login handshake (auth request, confirmation, exchange), license
//! credential lookup and license activation. The [`PlatformApi`] trait is the seam the
//! login broker and the startup pipeline are written against.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod payload;

pub use api::PlatformApi;
pub use client::PlatformClient;
pub use config::{PlatformApiConfig, DEFAULT_API_ENDPOINT, DEFAULT_TIMEOUT};
pub use error::PlatformApiError;
pub use payload::{AuthRequest, CredentialsInfo, LicenseRequest, MachineInfo, ProductInfo};
