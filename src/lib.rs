use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod client;
pub mod config;
pub mod sticker;
pub mod validation;

pub use crate::config::{ClientConfig, GatewayConfig};
pub use crate::sticker::StickerGateway;

use crate::validation::ValidationErrors;

/// JSON body of every error the gateway produces itself.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Geçersiz JSON gövdesi")]
    pub error: String,
    /// Per-field messages when contact validation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<ValidationErrors>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            fields: None,
        }
    }

    pub fn with_fields(message: impl Into<String>, fields: ValidationErrors) -> Self {
        Self {
            error: message.into(),
            fields: Some(fields),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::sticker::handlers::generate_sticker,
        crate::sticker::handlers::health,
    ),
    components(
        schemas(
            sticker::models::GenerationRequest,
            sticker::models::OutputFormat,
            sticker::models::HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Sticker Service", description = "QR contact sticker generation.")
    )
)]
pub struct ApiDoc;

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Arc::new(GatewayConfig::from_env()?);
    match config.upstream_base.as_deref() {
        Some(base) => log::info!("Forwarding sticker requests to {}", base),
        None => log::warn!(
            "API_BASE is not set; generation requests will fail until it is configured"
        ),
    }

    let gateway = web::Data::new(StickerGateway::new(config.clone())?);

    let prometheus = PrometheusMetricsBuilder::new("sticker_gateway")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(gateway.clone())
            .configure(sticker::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
