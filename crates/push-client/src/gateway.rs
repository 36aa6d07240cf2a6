//! Push gateway HTTP client.
//!
//! Device-scoped: the gateway tracks permission decisions per device id,
//! so repeated permission requests after a decision never re-prompt.

mod foreground;
#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    AppCredentials, ForegroundStream, PermissionState, PushError, PushTransport,
};

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    permission: PermissionState,
}

#[derive(Debug, Deserialize)]
struct RegistrationResponse {
    token: String,
}

/// Production [`PushTransport`] implementation over the push gateway.
pub struct PushGateway {
    http: reqwest::Client,
    base: Url,
    device_id: String,
}

impl PushGateway {
    pub fn new(gateway_url: &str, device_id: impl Into<String>) -> Result<Self, PushError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(gateway_url)?,
            device_id: device_id.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PushError> {
        Ok(self.base.join(path)?)
    }

    async fn parse_permission(resp: reqwest::Response) -> Result<PermissionState, PushError> {
        let resp = Self::check(resp).await?;
        let parsed: PermissionResponse = resp.json().await?;
        Ok(parsed.permission)
    }

    /// Map gateway status codes; 501 means the gateway has no push
    /// support for this device class.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, PushError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status.as_u16() == 501 {
            return Err(PushError::Unsupported);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(PushError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PushTransport for PushGateway {
    async fn permission(&self) -> Result<PermissionState, PushError> {
        let url = self.endpoint(&format!("v1/devices/{}/permission", self.device_id))?;
        let resp = self.http.get(url).send().await?;
        Self::parse_permission(resp).await
    }

    async fn request_permission(&self) -> Result<PermissionState, PushError> {
        let url = self.endpoint(&format!(
            "v1/devices/{}/permission/request",
            self.device_id
        ))?;
        let resp = self.http.post(url).send().await?;
        Self::parse_permission(resp).await
    }

    async fn fetch_token(&self, credentials: &AppCredentials) -> Result<String, PushError> {
        let url = self.endpoint("v1/registrations")?;
        let resp = self
            .http
            .post(url)
            .json(&json!({
                "device_id": self.device_id,
                "sender_id": credentials.sender_id,
                "app_id": credentials.app_id,
                "vapid_key": credentials.vapid_key,
            }))
            .header("X-Api-Key", &credentials.api_key)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 501 {
            return Err(PushError::Unsupported);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PushError::TokenFetch(format!("{status}: {body}")));
        }
        let parsed: RegistrationResponse = resp.json().await?;
        tracing::info!("Push registration token obtained");
        Ok(parsed.token)
    }

    async fn subscribe_topic(&self, token: &str, topic: &str) -> Result<(), PushError> {
        let url = self.endpoint(&format!("v1/topics/{topic}/subscriptions"))?;
        let resp = self.http.post(url).json(&json!({ "token": token })).send().await?;

        // 409 means the association already holds.
        if resp.status().as_u16() == 409 {
            tracing::debug!(topic, "Topic subscription already exists");
            return Ok(());
        }
        Self::check(resp).await?;
        tracing::info!(topic, "Subscribed token to topic");
        Ok(())
    }

    async fn foreground_stream(&self, token: &str) -> Result<ForegroundStream, PushError> {
        foreground::open(&self.base, token).await
    }
}
