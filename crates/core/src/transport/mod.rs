pub mod home_assistant;
pub mod http;
pub mod traits;

use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::settings::{ClientSettings, TransportSettings};

use home_assistant::HomeAssistantTransport;
use http::HttpTransport;
use traits::BackendTransport;

/// Build the transport described by `settings`.
pub fn connect(settings: &ClientSettings) -> Result<Arc<dyn BackendTransport>, CoreError> {
    settings.validate()?;
    let timeout = settings.timeout_secs;
    let transport: Arc<dyn BackendTransport> = match &settings.transport {
        TransportSettings::Standalone { base_url } => {
            Arc::new(HttpTransport::new(base_url, timeout))
        }
        TransportSettings::Ingress {
            base_url,
            ingress_path,
        } => Arc::new(HttpTransport::with_ingress(base_url, ingress_path, timeout)),
        TransportSettings::HomeAssistant {
            base_url,
            access_token,
            domain,
        } => Arc::new(HomeAssistantTransport::new(
            base_url,
            access_token.clone(),
            domain,
            timeout,
        )),
    };
    tracing::info!("connected {} transport", transport.name());
    Ok(transport)
}
