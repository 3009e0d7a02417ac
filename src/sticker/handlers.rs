use actix_web::{web, HttpResponse, Responder};

use crate::sticker::gateway::{GatewayError, StickerGateway};
use crate::sticker::models::{GenerationRequest, HealthResponse};
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Sticker Service",
    post,
    path = "/generate_sticker/{format}",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Rendered sticker, relayed from the generation service"),
        (status = 400, description = "Unknown format, malformed body or missing fields", body = ErrorResponse),
        (status = 500, description = "Upstream generation service not configured", body = ErrorResponse),
        (status = 502, description = "Generation service unreachable", body = ErrorResponse)
    ),
    params(
        ("format" = String, Path, description = "Output format, `png` or `pdf` (case-insensitive)")
    )
)]
pub async fn generate_sticker(
    format: web::Path<String>,
    body: web::Bytes,
    gateway: web::Data<StickerGateway>,
) -> Result<HttpResponse, GatewayError> {
    let format = format.into_inner();
    let result = gateway.handle(&format, &body).await;
    if let Err(e) = &result {
        log::warn!("Rejected sticker request for format '{}': {}", format, e);
    }
    result
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Sticker Service",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/generate_sticker/{format}")
            .route(web::post().to(generate_sticker)),
    )
    .service(web::resource("/health").route(web::get().to(health)));
}
