/// Default OpenAI-compatible gateway base URL.
const DEFAULT_API_URL: &str = "https://ai.gateway.lovable.dev/v1";
/// Default multimodal model.
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default outbound request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the vision API client.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_url: String,
    /// Bearer key sent in the `Authorization` header.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl VisionConfig {
    /// Load vision configuration from environment variables.
    ///
    /// | Env Var               | Required | Default                              |
    /// |-----------------------|----------|--------------------------------------|
    /// | `VISION_API_URL`      | no       | `https://ai.gateway.lovable.dev/v1`  |
    /// | `VISION_API_KEY`      | **yes**  | --                                   |
    /// | `VISION_MODEL`        | no       | `google/gemini-2.5-flash`            |
    /// | `VISION_TEMPERATURE`  | no       | `0.3`                                |
    /// | `VISION_TIMEOUT_SECS` | no       | `60`                                 |
    ///
    /// # Panics
    ///
    /// Panics if `VISION_API_KEY` is not set or a numeric value fails to parse.
    pub fn from_env() -> Self {
        let api_url = std::env::var("VISION_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let api_key =
            std::env::var("VISION_API_KEY").expect("VISION_API_KEY must be set in the environment");

        let model = std::env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let temperature: f32 = std::env::var("VISION_TEMPERATURE")
            .unwrap_or_else(|_| DEFAULT_TEMPERATURE.to_string())
            .parse()
            .expect("VISION_TEMPERATURE must be a valid f32");

        let timeout_secs: u64 = std::env::var("VISION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("VISION_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            temperature,
            timeout_secs,
        }
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}
