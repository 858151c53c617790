//! Gemini provider implementation.

use std::time::Duration;

use crate::options::{ModelOptions, TransportOptions};
use crate::providers::Provider;

pub use crate::api::gemini::{GeminiClient, GeminiModel};

/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Provider deadline used by [`Gemini::create`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Gemini;

impl Gemini {
    /// Create a client against a non-default API root (a proxy or a test server).
    pub fn create_with_base_url(
        api_key: String,
        base_url: String,
        model_options: ModelOptions<GeminiModel>,
        transport_options: TransportOptions,
    ) -> GeminiClient {
        GeminiClient::new(api_key, base_url, model_options, transport_options)
    }
}

impl Provider for Gemini {
    type Client = GeminiClient;

    fn create(api_key: String, model: String) -> Self::Client {
        Self::create_with_options(
            api_key,
            ModelOptions::new(model),
            TransportOptions::new().with_timeout(DEFAULT_TIMEOUT),
        )
    }

    fn create_with_options(
        api_key: String,
        model_options: ModelOptions<GeminiModel>,
        transport_options: TransportOptions,
    ) -> Self::Client {
        Self::create_with_base_url(
            api_key,
            DEFAULT_BASE_URL.to_string(),
            model_options,
            transport_options,
        )
    }
}
