use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoreError;

/// Where the client runs relative to the host dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingMode {
    /// Talking straight to the add-on backend (fixed port or ingress).
    Standalone,
    /// Inside the host dashboard, going through its API/service bridge.
    Embedded,
}

/// A multipart upload: plain text fields plus one file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormUpload {
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Capability interface over the backend (Dependency Inversion).
///
/// The view-model only ever talks to this trait, so it behaves the same over
/// the host's RPC bridge and over direct HTTP. Paths are relative
/// (`transactions/E1`); each implementation owns its URL prefix.
///
/// Non-2xx answers must surface as `CoreError::FetchFailed` carrying the
/// status and the backend's raw text. Empty 2xx bodies decode to `Value::Null`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait BackendTransport: Send + Sync {
    /// Human-readable name of this transport (for logs/errors).
    fn name(&self) -> &str;

    fn hosting_mode(&self) -> HostingMode;

    async fn get(&self, path: &str) -> Result<Value, CoreError>;

    async fn post(&self, path: &str, body: &Value) -> Result<Value, CoreError>;

    async fn put(&self, path: &str, body: &Value) -> Result<Value, CoreError>;

    async fn delete(&self, path: &str) -> Result<(), CoreError>;

    /// Download a binary body as-is.
    async fn get_blob(&self, path: &str) -> Result<Vec<u8>, CoreError>;

    /// Upload a multipart form; the response body is ignored.
    async fn post_form(&self, path: &str, form: FormUpload) -> Result<(), CoreError>;

    /// Invoke a host service of the integration (embedded mode only).
    async fn call_service(&self, service: &str, data: &Value) -> Result<(), CoreError>;
}
