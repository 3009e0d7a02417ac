//! Process-wide configuration, read once from the environment at startup.

use std::env;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// How strictly the gateway checks contact fields before forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Run the full contact rules shared with the client.
    #[default]
    Strict,
    /// Only require both fields to be non-empty.
    Presence,
}

impl std::str::FromStr for ValidationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "presence" => Ok(ValidationMode::Presence),
            _ => Err(()),
        }
    }
}

/// Server-side settings for the generation gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the upstream sticker renderer. `None` means the deployment is
    /// not configured and every generation request fails with 500.
    pub upstream_base: Option<String>,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub upstream_timeout: Option<Duration>,
    pub validation: ValidationMode,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream_base: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            upstream_timeout: None,
            validation: ValidationMode::Strict,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_base = lookup("API_BASE")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| lookup("BACKEND_API_BASE"))
            .and_then(|v| normalize_base(&v));

        let host = lookup("HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = split_origins(
            &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) if !raw.trim().is_empty() => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    name: "UPSTREAM_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        let validation = match lookup("GATEWAY_VALIDATION") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse::<ValidationMode>().map_err(|_| ConfigError::InvalidValue {
                    name: "GATEWAY_VALIDATION",
                    value: raw.clone(),
                })?
            }
            _ => ValidationMode::Strict,
        };

        Ok(Self {
            upstream_base,
            host,
            port,
            allowed_origins,
            upstream_timeout,
            validation,
        })
    }

    pub fn with_upstream(mut self, base: impl AsRef<str>) -> Self {
        self.upstream_base = normalize_base(base.as_ref());
        self
    }

    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }
}

/// Client-side settings: where the session controller sends its requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gateway_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway_url = lookup("STICKER_GATEWAY_URL")
            .and_then(|v| normalize_base(&v))
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        Self { gateway_url }
    }

    pub fn new(gateway_url: impl AsRef<str>) -> Self {
        Self {
            gateway_url: normalize_base(gateway_url.as_ref())
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
        }
    }
}

fn normalize_base(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
