use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Integration domain used when the host does not name one.
pub const DEFAULT_INTEGRATION: &str = "portfolio_crypto";

/// Port the standalone add-on backend listens on.
pub const DEFAULT_STANDALONE_URL: &str = "http://localhost:5000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration handed over by the host dashboard (panel or card config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub entry_id: String,

    /// Preselected asset (card variant)
    #[serde(default)]
    pub crypto_id: Option<String>,

    #[serde(default)]
    pub crypto_name: Option<String>,

    /// Display name of the portfolio entry
    #[serde(default)]
    pub entry_name: Option<String>,

    #[serde(default)]
    pub integration_name: Option<String>,
}

impl CardConfig {
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            crypto_id: None,
            crypto_name: None,
            entry_name: None,
            integration_name: None,
        }
    }

    /// Panel contract: an entry must be configured.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.entry_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig("entry_id is required".into()));
        }
        Ok(())
    }

    /// Card contract: both the entry and the asset must be configured.
    pub fn require_crypto(&self) -> Result<(), CoreError> {
        self.validate()?;
        match self.crypto_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(()),
            _ => Err(CoreError::InvalidConfig(
                "entry_id and crypto_id are both required".into(),
            )),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.entry_name.as_deref().unwrap_or(&self.entry_id)
    }

    #[must_use]
    pub fn integration(&self) -> &str {
        self.integration_name.as_deref().unwrap_or(DEFAULT_INTEGRATION)
    }
}

/// How the backend is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransportSettings {
    /// Direct requests against the add-on's own port.
    Standalone { base_url: String },

    /// Direct requests under a Supervisor ingress prefix.
    Ingress { base_url: String, ingress_path: String },

    /// Through the host's API bridge (`callApi` / `callService`).
    HomeAssistant {
        base_url: String,
        access_token: String,
        #[serde(default = "default_domain")]
        domain: String,
    },
}

fn default_domain() -> String {
    DEFAULT_INTEGRATION.to_string()
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings::Standalone {
            base_url: DEFAULT_STANDALONE_URL.to_string(),
        }
    }
}

/// Client-side settings for reaching the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub transport: TransportSettings,

    /// Request timeout (ignored on wasm32, where the browser owns timeouts)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            transport: TransportSettings::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientSettings {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: ClientSettings = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidConfig(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let base_url = match &self.transport {
            TransportSettings::Standalone { base_url } => base_url,
            TransportSettings::Ingress { base_url, .. } => base_url,
            TransportSettings::HomeAssistant {
                base_url,
                access_token,
                ..
            } => {
                if access_token.trim().is_empty() {
                    return Err(CoreError::InvalidConfig(
                        "access_token is required for home_assistant mode".into(),
                    ));
                }
                base_url
            }
        };
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CoreError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got '{base_url}'"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
