//! Process configuration read from the environment at startup.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::options::{ModelOptions, TransportOptions};
use crate::providers::gemini::{self, Gemini, GeminiClient, GeminiModel};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const BIND_ADDR_VAR: &str = "MATHLENS_BIND_ADDR";
pub const UPLOAD_DIR_VAR: &str = "MATHLENS_UPLOAD_DIR";
pub const MODEL_VAR: &str = "MATHLENS_MODEL";
pub const BASE_URL_VAR: &str = "MATHLENS_GEMINI_BASE_URL";
pub const TIMEOUT_VAR: &str = "MATHLENS_PROVIDER_TIMEOUT_SECS";
pub const MAX_UPLOAD_VAR: &str = "MATHLENS_MAX_UPLOAD_BYTES";

pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Errors that prevent the service from starting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY must be set to a non-empty value")]
    MissingApiKey,

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable service configuration.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub model: String,
    pub gemini_base_url: String,
    pub provider_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("upload_dir", &self.upload_dir)
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("provider_timeout", &self.provider_timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and empty variables both take their defaults, except the API
    /// key, which is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;

        let bind_addr = parse_or(get(BIND_ADDR_VAR), BIND_ADDR_VAR, DEFAULT_BIND_ADDR)?;

        let upload_dir = get(UPLOAD_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("mathlens-uploads"));

        let model = get(MODEL_VAR).unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());

        let gemini_base_url =
            get(BASE_URL_VAR).unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string());

        let provider_timeout = match get(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = parse(&raw, TIMEOUT_VAR)?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: TIMEOUT_VAR,
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => gemini::DEFAULT_TIMEOUT,
        };

        let max_upload_bytes =
            parse_or(get(MAX_UPLOAD_VAR), MAX_UPLOAD_VAR, DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Self {
            api_key,
            bind_addr,
            upload_dir,
            model,
            gemini_base_url,
            provider_timeout,
            max_upload_bytes,
        })
    }

    pub fn model_options(&self) -> ModelOptions<GeminiModel> {
        ModelOptions::new(self.model.clone())
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions::new().with_timeout(self.provider_timeout)
    }

    /// Build the solver client this configuration describes.
    pub fn gemini_client(&self) -> GeminiClient {
        Gemini::create_with_base_url(
            self.api_key.clone(),
            self.gemini_base_url.clone(),
            self.model_options(),
            self.transport_options(),
        )
    }
}

fn parse<T>(raw: &str, var: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => parse(&raw, var),
        None => Ok(default),
    }
}
