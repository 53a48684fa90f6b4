use serde::{Deserialize, Serialize};

/// Pending device-login request created by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub id: String,
    pub code: String,
    pub exchange_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRequest {
    pub product: ProductInfo,
    pub credentials: CredentialsInfo,
    pub machine: MachineInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsInfo {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform_release: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthRequestStatus {
    pub confirmed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExchangeBody<'a> {
    pub exchange_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthTokenResponse {
    pub auth_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LicenseTokenResponse {
    pub token: String,
}
