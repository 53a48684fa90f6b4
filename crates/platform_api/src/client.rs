use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::PlatformApi;
use crate::config::PlatformApiConfig;
use crate::error::{license_error, PlatformApiError};
use crate::payload::{
    AuthRequest, AuthRequestStatus, AuthTokenResponse, ExchangeBody, LicenseRequest,
    LicenseTokenResponse,
};

#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: Client,
    config: PlatformApiConfig,
}

impl PlatformClient {
    pub fn new(config: PlatformApiConfig) -> Result<Self, PlatformApiError> {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let http = builder.build().map_err(PlatformApiError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PlatformApiConfig {
        &self.config
    }
}

#[async_trait]
impl PlatformApi for PlatformClient {
    async fn create_auth_request(&self) -> Result<AuthRequest, PlatformApiError> {
        const OPERATION: &str = "create auth request";
        let response = self
            .http
            .post(self.config.endpoint("/v1/auth/request"))
            .send()
            .await
            .map_err(|source| PlatformApiError::request(OPERATION, source))?;

        let response = expect_status(OPERATION, response, &[StatusCode::OK, StatusCode::CREATED])
            .await?;
        let request: AuthRequest = decode(OPERATION, response).await?;
        tracing::debug!(id = %request.id, "created auth request");
        Ok(request)
    }

    async fn check_auth_request_confirmed(
        &self,
        id: &str,
        exchange_token: &str,
    ) -> Result<bool, PlatformApiError> {
        const OPERATION: &str = "check auth request";
        let response = self
            .http
            .get(self.config.endpoint(&format!("/v1/auth/request/{id}")))
            .query(&[("exchange_token", exchange_token)])
            .send()
            .await
            .map_err(|source| PlatformApiError::request(OPERATION, source))?;

        let response = expect_status(OPERATION, response, &[StatusCode::OK]).await?;
        let status: AuthRequestStatus = decode(OPERATION, response).await?;
        Ok(status.confirmed)
    }

    async fn exchange_auth_request(
        &self,
        id: &str,
        exchange_token: &str,
    ) -> Result<String, PlatformApiError> {
        const OPERATION: &str = "exchange auth request";
        let response = self
            .http
            .post(self.config.endpoint(&format!("/v1/auth/request/{id}/exchange")))
            .json(&ExchangeBody { exchange_token })
            .send()
            .await
            .map_err(|source| PlatformApiError::request(OPERATION, source))?;

        let response = expect_status(OPERATION, response, &[StatusCode::OK]).await?;
        let token: AuthTokenResponse = decode(OPERATION, response).await?;
        Ok(token.auth_token)
    }

    async fn get_license_token(&self, bearer_token: &str) -> Result<String, PlatformApiError> {
        const OPERATION: &str = "get license token";
        let response = self
            .http
            .get(self.config.endpoint("/v1/license/credentials"))
            .header(AUTHORIZATION, bearer_token)
            .send()
            .await
            .map_err(|source| PlatformApiError::request(OPERATION, source))?;

        let response =
            expect_status(OPERATION, response, &[StatusCode::OK, StatusCode::ACCEPTED]).await?;
        let token: LicenseTokenResponse = decode(OPERATION, response).await?;
        Ok(token.token)
    }

    async fn get_license(&self, request: &LicenseRequest) -> Result<(), PlatformApiError> {
        let response = self
            .http
            .post(self.config.endpoint("/v1/license/request"))
            .json(request)
            .send()
            .await
            .map_err(|source| PlatformApiError::request("request license", source))?;

        match response.status() {
            StatusCode::OK => {
                tracing::debug!(
                    product = %request.product.name,
                    version = %request.product.version,
                    "license granted"
                );
                Ok(())
            }
            status => Err(license_error(status)),
        }
    }
}

async fn expect_status(
    operation: &'static str,
    response: Response,
    accepted: &[StatusCode],
) -> Result<Response, PlatformApiError> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(operation, status = status.as_u16(), "platform request rejected");
    Err(PlatformApiError::Status {
        operation,
        status,
        body,
    })
}

async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> Result<T, PlatformApiError> {
    response
        .json::<T>()
        .await
        .map_err(|source| PlatformApiError::decode(operation, source))
}
