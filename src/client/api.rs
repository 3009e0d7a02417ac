//! Network transport used by the session controller.

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::sticker::models::{GenerationRequest, GenerationResult, OutputFormat};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("generation request failed with status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that can turn a contact pair into a rendered sticker.
#[async_trait]
pub trait StickerApi: Send + Sync {
    async fn generate(
        &self,
        format: OutputFormat,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ClientError>;
}

/// Talks to the generation gateway over HTTP.
#[derive(Clone)]
pub struct GatewayClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: ClientConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn endpoint(&self, format: OutputFormat) -> String {
        format!("{}{}", self.config.gateway_url, format.endpoint_path())
    }
}

#[async_trait]
impl StickerApi for GatewayClient {
    async fn generate(
        &self,
        format: OutputFormat,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ClientError> {
        let response = self
            .http_client
            .post(self.endpoint(format))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format.default_content_type().to_string());
        let body = response.bytes().await?;

        Ok(GenerationResult {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
