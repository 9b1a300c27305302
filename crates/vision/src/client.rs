//! HTTP client for the chat-completions endpoint.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::StatusCode;

use crate::config::VisionConfig;
use crate::messages::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl};

/// Errors from the vision API layer.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered 429.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// The gateway answered 402: the account has no credits left.
    #[error("AI credits depleted. Please add credits to your workspace.")]
    BillingRequired,

    /// Any other non-2xx status.
    #[error("Vision API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response without any answer text.
    #[error("Vision API returned no answer")]
    EmptyAnswer,
}

/// Client for a single OpenAI-compatible inference gateway.
pub struct VisionClient {
    client: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    /// Create a client with its own connection pool and the configured timeout.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Send `image` with `prompt` and return the model's raw answer text.
    pub async fn analyze_image(
        &self,
        prompt: &str,
        content_type: &str,
        image: &[u8],
    ) -> Result<String, VisionError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url(content_type, image),
                        },
                    },
                ],
            }],
            temperature: self.config.temperature,
        };

        tracing::debug!(
            model = %self.config.model,
            image_bytes = image.len(),
            "Sending image to vision API",
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed: ChatResponse = response.json().await?;
        parsed.first_answer().ok_or(VisionError::EmptyAnswer)
    }

    // ---- private helpers ----

    /// Map a non-success status to the matching [`VisionError`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, VisionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!(status = status.as_u16(), "Vision API call failed");
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(VisionError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => Err(VisionError::BillingRequired),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                Err(VisionError::ApiError {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Encode image bytes as a `data:` URL.
pub fn image_data_url(content_type: &str, image: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(image))
}
