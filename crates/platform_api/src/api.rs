use async_trait::async_trait;

use crate::error::PlatformApiError;
use crate::payload::{AuthRequest, LicenseRequest};

/// Remote operations the login broker and startup pipeline depend on.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn create_auth_request(&self) -> Result<AuthRequest, PlatformApiError>;

    async fn check_auth_request_confirmed(
        &self,
        id: &str,
        exchange_token: &str,
    ) -> Result<bool, PlatformApiError>;

    /// Trades a confirmed auth request for a bearer token.
    async fn exchange_auth_request(
        &self,
        id: &str,
        exchange_token: &str,
    ) -> Result<String, PlatformApiError>;

    /// Resolves the license token that containers are started with.
    async fn get_license_token(&self, bearer_token: &str) -> Result<String, PlatformApiError>;

    async fn get_license(&self, request: &LicenseRequest) -> Result<(), PlatformApiError>;
}
