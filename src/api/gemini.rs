//! Google Gemini API client implementation.
//!
//! Sends a single non-streaming `generateContent` call carrying the prompt
//! text and the image as inline data.
//! See: <https://ai.google.dev/api/generate-content>

use async_trait::async_trait;
use nonempty::NonEmpty;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::{Client, ClientError};
use crate::http::{add_extra_headers, build_http_client, RequestBuilderExt, ResponseExt};
use crate::mime::MimeType;
use crate::model::{SolverPrompt, SolverResult};
use crate::options::{ModelOptions, TransportOptions};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini-specific model options.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeminiModel {
    pub top_k: Option<u32>,
}

/// Gemini client using HTTP transport.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model_options: ModelOptions<GeminiModel>,
    transport_options: TransportOptions,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// `base_url` is the versioned API root, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(
        api_key: String,
        base_url: String,
        model_options: ModelOptions<GeminiModel>,
        transport_options: TransportOptions,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_options,
            transport_options,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model_options.model
        )
    }

    /// Classify a Gemini error response.
    fn handle_error_response(status: StatusCode, body: &str) -> ClientError {
        let parsed = serde_json::from_str::<GeminiErrorResponse>(body).ok();

        let auth_failure = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            || parsed.as_ref().is_some_and(|resp| resp.error.is_auth_failure());

        let message = match parsed {
            Some(resp) => format!("Gemini error ({}): {}", resp.error.code, resp.error.message),
            None => format!("HTTP {}: {}", status, body),
        };

        if auth_failure {
            ClientError::Auth(message)
        } else {
            ClientError::Provider(message)
        }
    }
}

impl GeminiRequest {
    fn new(prompt: SolverPrompt, model_options: &ModelOptions<GeminiModel>) -> Self {
        let SolverPrompt { instruction, image } = prompt;

        let generation_config = GeminiGenerationConfig {
            temperature: model_options.temperature,
            top_p: model_options.top_p,
            top_k: model_options.provider.top_k,
            max_output_tokens: model_options.max_tokens,
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some(GeminiRole::User),
                parts: vec![
                    GeminiPart::Text {
                        thought: None,
                        text: instruction,
                    },
                    GeminiPart::InlineData {
                        inline_data: GeminiBlob {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    },
                ],
            }],
            system_instruction: model_options.system.clone().map(|system| GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    thought: None,
                    text: system,
                }],
            }),
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }
}

impl TryFrom<GeminiResponse> for SolverResult {
    type Error = ClientError;

    fn try_from(resp: GeminiResponse) -> Result<Self, Self::Error> {
        let Some(candidates) = resp.candidates else {
            let reason = resp
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(ClientError::Provider(format!("prompt rejected: {}", reason)));
        };

        let first = candidates.head;
        let text: String = first
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match part {
                GeminiPart::Text { thought, text } if !thought.unwrap_or_default() => Some(text),
                _ => None,
            })
            .collect();

        if text.trim().is_empty() {
            let reason = first
                .finish_reason
                .unwrap_or_else(|| "UNSPECIFIED".to_string());
            return Err(ClientError::Provider(format!(
                "completion contained no text (finish reason: {})",
                reason
            )));
        }

        Ok(SolverResult { text })
    }
}

#[async_trait]
impl Client for GeminiClient {
    type ModelProvider = GeminiModel;

    async fn solve(&self, prompt: SolverPrompt) -> Result<SolverResult, ClientError> {
        if self.api_key.is_empty() {
            return Err(ClientError::Auth("Gemini API key is not set".to_string()));
        }
        if self.model_options.model.is_empty() {
            return Err(ClientError::Config("Model must be specified".to_string()));
        }

        let request_body = GeminiRequest::new(prompt, &self.model_options);

        // Build HTTP client with transport options
        let http_client = build_http_client(&self.transport_options)?;

        let mut req = http_client
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key);

        req = add_extra_headers(req, &self.transport_options);

        tracing::debug!(
            model = %self.model_options.model,
            "Sending Gemini generateContent request"
        );
        let response = req.json_logged(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text_logged().await?;
            return Err(Self::handle_error_response(status, &body));
        }

        let gemini_response: GeminiResponse = response.json_logged().await?;
        gemini_response.try_into()
    }

    fn model_options(&self) -> &ModelOptions<Self::ModelProvider> {
        &self.model_options
    }

    fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }
}

// --- Gemini API Request/Response Types ---

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: Option<GeminiContent>,
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum GeminiRole {
    User,
    Model,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    role: Option<GeminiRole>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: MimeType,
    data: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
enum GeminiPart {
    Text {
        thought: Option<bool>,
        text: String,
    },
    #[serde(skip_deserializing)]
    InlineData { inline_data: GeminiBlob },
    /// Anything the solver does not consume (function calls, executable code, ...).
    Other(serde_json::Value),
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
    max_output_tokens: Option<u32>,
}

impl GeminiGenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
            && self.max_output_tokens.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Option<NonEmpty<GeminiCandidate>>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiError {
    code: u32,
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<GeminiErrorDetail>,
}

impl GeminiError {
    fn is_auth_failure(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED")
        ) || self
            .details
            .iter()
            .any(|detail| detail.reason.as_deref() == Some("API_KEY_INVALID"))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}
