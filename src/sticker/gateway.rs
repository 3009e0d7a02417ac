//! Generation gateway: checks an incoming sticker request and relays it to the
//! upstream renderer.
//!
//! Checks run in a fixed order and the first failure wins: output format,
//! deployment configuration, JSON body, required fields, contact rules. The
//! upstream status, content type and body are passed back without inspection.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use futures_util::StreamExt;
use std::sync::Arc;

use crate::config::{GatewayConfig, ValidationMode};
use crate::sticker::models::{GenerationRequest, IncomingPayload, OutputFormat};
use crate::validation::{ContactRules, ValidationErrors};
use crate::ErrorResponse;

pub const INVALID_FORMAT: &str = "Geçersiz format";
pub const NOT_CONFIGURED: &str = "Sunucu yapılandırılmadı (API_BASE)";
pub const INVALID_BODY: &str = "Geçersiz JSON gövdesi";
pub const MISSING_FIELDS: &str = "'name' ve 'phone' alanları zorunlu";
pub const INVALID_FIELDS: &str = "Lütfen formdaki hataları düzeltin.";
pub const UPSTREAM_UNREACHABLE: &str = "Sticker oluşturma servisine ulaşılamadı";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{}: {0}", INVALID_FORMAT)]
    UnsupportedFormat(String),
    #[error("{}", NOT_CONFIGURED)]
    NotConfigured,
    #[error("{}", INVALID_BODY)]
    InvalidBody(#[source] serde_json::Error),
    #[error("{}", MISSING_FIELDS)]
    MissingFields,
    #[error("{}", INVALID_FIELDS)]
    InvalidFields(ValidationErrors),
    #[error("{}", UPSTREAM_UNREACHABLE)]
    Upstream(#[source] reqwest::Error),
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UnsupportedFormat(_)
            | GatewayError::InvalidBody(_)
            | GatewayError::MissingFields
            | GatewayError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            GatewayError::InvalidFields(errors) => {
                ErrorResponse::with_fields(self.to_string(), errors.clone())
            }
            _ => ErrorResponse::new(self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Server-side ingress for sticker generation.
#[derive(Clone)]
pub struct StickerGateway {
    config: Arc<GatewayConfig>,
    http_client: reqwest::Client,
    rules: ContactRules,
}

impl StickerGateway {
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(900))
            .user_agent(concat!("sticker-gateway/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(config, builder.build()?))
    }

    pub fn with_client(config: Arc<GatewayConfig>, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            rules: ContactRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ContactRules) -> Self {
        self.rules = rules;
        self
    }

    /// Run the checks and, when they pass, forward to the renderer.
    pub async fn handle(&self, format: &str, raw_body: &[u8]) -> Result<HttpResponse, GatewayError> {
        let (format, base, request) = self.admit(format, raw_body)?;
        self.forward(format, base, &request).await
    }

    /// Every check that happens before the upstream call.
    pub fn admit<'a>(
        &'a self,
        format: &str,
        raw_body: &[u8],
    ) -> Result<(OutputFormat, &'a str, GenerationRequest), GatewayError> {
        let format: OutputFormat = format
            .parse()
            .map_err(|_| GatewayError::UnsupportedFormat(format.to_lowercase()))?;

        let base = self
            .config
            .upstream_base
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or(GatewayError::NotConfigured)?;

        let value: serde_json::Value =
            serde_json::from_slice(raw_body).map_err(GatewayError::InvalidBody)?;

        let request = IncomingPayload::from_json(value)
            .into_request()
            .ok_or(GatewayError::MissingFields)?;

        if self.config.validation == ValidationMode::Strict {
            request
                .validate(&self.rules)
                .into_result()
                .map_err(GatewayError::InvalidFields)?;
        }

        Ok((format, base, request))
    }

    async fn forward(
        &self,
        format: OutputFormat,
        base: &str,
        request: &GenerationRequest,
    ) -> Result<HttpResponse, GatewayError> {
        let url = format!("{}{}", base, format.endpoint_path());

        let upstream = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Upstream request to {} failed: {}", url, e);
                GatewayError::Upstream(e)
            })?;

        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = upstream
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format.default_content_type().to_string());
        let disposition = upstream
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        log::info!(
            "Relaying {} sticker from upstream with status {}",
            format,
            status.as_u16()
        );

        let mut response = HttpResponse::build(status);
        response.insert_header((header::CONTENT_TYPE, content_type));
        if let Some(disposition) = disposition {
            response.insert_header((header::CONTENT_DISPOSITION, disposition));
        }

        let body = upstream.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                log::error!("Upstream body stream failed: {}", e);
                e
            })
        });

        Ok(response.streaming(body))
    }
}
