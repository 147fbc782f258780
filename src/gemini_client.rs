use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generation parameters sent with every completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_output_tokens: 1024,
        }
    }
}

/// A single prompt-in, text-out completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends `prompt` and returns the model's raw text reply.
    async fn generate(
        &self,
        prompt: &str,
        generation: &GenerationConfig,
    ) -> Result<String, AppError>;

    fn model_name(&self) -> &str;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    ///
    /// Fails when the API key is blank; there is no fallback credential.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigurationError(
                "Google API key not provided. Set GOOGLE_API_KEY in environment.".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.gemini_base_url.clone(),
            config.google_api_key.clone(),
            config.gemini_model.clone(),
            Duration::from_secs(config.gemini_timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request<'a>(prompt: &'a str, generation: &GenerationConfig) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: RequestGenerationConfig {
                temperature: generation.temperature,
                max_output_tokens: generation.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        generation: &GenerationConfig,
    ) -> Result<String, AppError> {
        let url = self.endpoint();
        tracing::info!(
            "Calling Gemini model {} (prompt: {} chars)",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(prompt, generation))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Gemini returned {}: {}",
                status, error_text
            )));
        }

        let data: GenerateResponse = response.json().await?;

        let text = data.text().ok_or_else(|| {
            AppError::ExternalApiError("Gemini response contained no text".to_string())
        })?;

        tracing::debug!("Gemini replied with {} chars", text.len());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: RequestGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
