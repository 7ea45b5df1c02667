use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::http::{build_client, ensure_success, multipart_form, read_json};
use super::traits::{BackendTransport, FormUpload, HostingMode};
use crate::errors::CoreError;

/// Transport through the host dashboard's API bridge.
///
/// Mirrors what the embedded card gets from its host object:
/// - `callApi(method, path)` → `{base_url}/api/{domain}/{path}`
/// - `callService(domain, service, data)` → `POST {base_url}/api/services/{domain}/{service}`
///
/// Every request carries the long-lived access token as a bearer token.
pub struct HomeAssistantTransport {
    client: Client,
    base_url: String,
    access_token: String,
    domain: String,
}

impl HomeAssistantTransport {
    pub fn new(
        base_url: &str,
        access_token: impl Into<String>,
        domain: &str,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            domain: domain.trim_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// URL of an integration API path (`callApi`).
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url,
            self.domain,
            path.trim_start_matches('/')
        )
    }

    /// URL of an integration service (`callService`).
    #[must_use]
    pub fn service_url(&self, service: &str) -> String {
        format!("{}/api/services/{}/{}", self.base_url, self.domain, service)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.access_token)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BackendTransport for HomeAssistantTransport {
    fn name(&self) -> &str {
        "Home Assistant"
    }

    fn hosting_mode(&self) -> HostingMode {
        HostingMode::Embedded
    }

    async fn get(&self, path: &str) -> Result<Value, CoreError> {
        tracing::debug!("callApi GET {path}");
        let resp = self.authed(self.client.get(self.api_url(path))).send().await?;
        read_json(resp).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        tracing::debug!("callApi POST {path}");
        let resp = self
            .authed(self.client.post(self.api_url(path)))
            .json(body)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        tracing::debug!("callApi PUT {path}");
        let resp = self
            .authed(self.client.put(self.api_url(path)))
            .json(body)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), CoreError> {
        tracing::debug!("callApi DELETE {path}");
        let resp = self
            .authed(self.client.delete(self.api_url(path)))
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn get_blob(&self, path: &str) -> Result<Vec<u8>, CoreError> {
        tracing::debug!("callApi GET (blob) {path}");
        let resp = self.authed(self.client.get(self.api_url(path))).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn post_form(&self, path: &str, form: FormUpload) -> Result<(), CoreError> {
        tracing::debug!("callApi POST (multipart) {path}");
        let resp = self
            .authed(self.client.post(self.api_url(path)))
            .multipart(multipart_form(form)?)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn call_service(&self, service: &str, data: &Value) -> Result<(), CoreError> {
        tracing::debug!("callService {}.{service}", self.domain);
        let resp = self
            .authed(self.client.post(self.service_url(service)))
            .json(data)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }
}
