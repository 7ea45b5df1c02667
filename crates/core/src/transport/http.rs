use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::{BackendTransport, FormUpload, HostingMode};
use crate::errors::CoreError;

/// Direct `fetch`-style transport against the add-on backend.
///
/// - **Standalone**: a fixed local port, e.g. `http://localhost:5000`.
/// - **Ingress**: the same routes under a Supervisor ingress prefix,
///   e.g. `http://homeassistant.local:8123/api/hassio_ingress/<token>`.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Backend reached through an ingress prefix appended to `base_url`.
    pub fn with_ingress(base_url: &str, ingress_path: &str, timeout_secs: u64) -> Self {
        let prefix = ingress_path.trim_matches('/');
        let base = base_url.trim_end_matches('/');
        let full = if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        };
        Self::new(&full, timeout_secs)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a relative backend path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

pub(crate) fn build_client(timeout_secs: u64) -> Client {
    let builder = Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(Duration::from_secs(timeout_secs));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_secs;
    builder.build().unwrap_or_else(|_| Client::new())
}

/// Turn a non-2xx response into `FetchFailed` with the backend's raw text.
pub(crate) async fn ensure_success(resp: Response) -> Result<Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .text()
        .await
        .unwrap_or_else(|_| "unreadable error body".to_string());
    tracing::warn!("backend answered {status}: {message}");
    Err(CoreError::FetchFailed {
        status: Some(status.as_u16()),
        message,
    })
}

/// Decode a JSON body; an empty body is `Value::Null`.
pub(crate) async fn read_json(resp: Response) -> Result<Value, CoreError> {
    let resp = ensure_success(resp).await?;
    let text = resp.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| CoreError::InvalidResponse(format!("body is not JSON: {e}")))
}

pub(crate) fn multipart_form(upload: FormUpload) -> Result<Form, CoreError> {
    let mut form = Form::new();
    for (name, value) in upload.fields {
        form = form.text(name, value);
    }
    let part = Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str("application/octet-stream")
        .map_err(|e| CoreError::Serialization(format!("Failed to build upload: {e}")))?;
    Ok(form.part(upload.file_field, part))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BackendTransport for HttpTransport {
    fn name(&self) -> &str {
        "HTTP"
    }

    fn hosting_mode(&self) -> HostingMode {
        HostingMode::Standalone
    }

    async fn get(&self, path: &str) -> Result<Value, CoreError> {
        tracing::debug!("GET {path}");
        let resp = self.client.get(self.url_for(path)).send().await?;
        read_json(resp).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        tracing::debug!("POST {path}");
        let resp = self.client.post(self.url_for(path)).json(body).send().await?;
        read_json(resp).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        tracing::debug!("PUT {path}");
        let resp = self.client.put(self.url_for(path)).json(body).send().await?;
        read_json(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), CoreError> {
        tracing::debug!("DELETE {path}");
        let resp = self.client.delete(self.url_for(path)).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn get_blob(&self, path: &str) -> Result<Vec<u8>, CoreError> {
        tracing::debug!("GET (blob) {path}");
        let resp = self.client.get(self.url_for(path)).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn post_form(&self, path: &str, form: FormUpload) -> Result<(), CoreError> {
        tracing::debug!("POST (multipart) {path}");
        let resp = self
            .client
            .post(self.url_for(path))
            .multipart(multipart_form(form)?)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn call_service(&self, service: &str, _data: &Value) -> Result<(), CoreError> {
        Err(CoreError::Unsupported(format!(
            "service '{service}' needs the host bridge; direct HTTP has no service calls"
        )))
    }
}
