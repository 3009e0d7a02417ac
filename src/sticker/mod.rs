pub mod gateway;
pub mod handlers;
pub mod models;

pub use gateway::{GatewayError, StickerGateway};
pub use handlers::config;
pub use models::{GenerationRequest, GenerationResult, OutputFormat};
