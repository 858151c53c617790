//! Solver client trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{SolverPrompt, SolverResult};
use crate::options::{ModelOptions, TransportOptions};

/// Errors that can occur while asking a provider for a solution.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing or rejected provider credential.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider answered with an error or without a usable completion.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider did not answer before the transport deadline.
    #[error("Provider did not respond before the deadline")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Auth(_) => "auth",
            ClientError::Provider(_) | ClientError::Http(_) | ClientError::Parse(_) => "provider",
            ClientError::Timeout => "timeout",
            ClientError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Http(err)
        }
    }
}

/// A backend able to turn an image prompt into a textual solution.
#[async_trait]
pub trait Client: Send + Sync {
    /// Provider-specific model options type.
    type ModelProvider: Send + Sync;

    /// Submit one prompt and wait for its single completion.
    async fn solve(&self, prompt: SolverPrompt) -> Result<SolverResult, ClientError>;

    /// Get reference to the model options.
    fn model_options(&self) -> &ModelOptions<Self::ModelProvider>;

    /// Get reference to the transport options.
    fn transport_options(&self) -> &TransportOptions;
}
