use actix_web::web::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::validation::{self, ContactRules, ValidationErrors};

/// Contact data sent to the renderer. Built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerationRequest {
    #[schema(example = "Baki Tekin")]
    pub name: String,
    #[schema(example = "+90 555 123 45 67")]
    pub phone: String,
}

impl GenerationRequest {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    pub fn validate(&self, rules: &ContactRules) -> ValidationErrors {
        rules.check(&self.name, &self.phone)
    }
}

/// Loosely typed body as received by the gateway. Fields that are absent or
/// not strings end up as `None`.
#[derive(Debug, Default, Deserialize)]
pub struct IncomingPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl IncomingPayload {
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Both fields present and non-empty.
    pub fn into_request(self) -> Option<GenerationRequest> {
        if !validation::presence(self.name.as_deref(), self.phone.as_deref()) {
            return None;
        }
        match (self.name, self.phone) {
            (Some(name), Some(phone)) => Some(GenerationRequest { name, phone }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// Content type used when the renderer does not declare one.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    pub fn download_filename(&self) -> String {
        format!("sticker.{}", self.as_str())
    }

    /// Path of the generation endpoint for this format, relative to a base URL.
    pub fn endpoint_path(&self) -> String {
        format!("/api/generate_sticker/{}", self.as_str())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported output format: {0}")]
pub struct UnsupportedFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(UnsupportedFormat(s.to_string())),
        }
    }
}

/// Rendered sticker as returned by the generation service.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}
