use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::gemini_client::{GenerationConfig, LanguageModel};
use crate::models::{ClientProfile, CoverageResult, ProfileSnapshot};
use crate::normalizer::normalize;
use crate::prompt::build_prompt;
use crate::sanitizer::extract_json;

/// Error tag carried by the payload that stands in for a failed model call.
pub const UPSTREAM_FAILURE_TAG: &str = "gemini_call_failed";

/// Structured stand-in for a failed model call.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamFailure {
    pub error: &'static str,
    pub detail: String,
}

impl UpstreamFailure {
    fn new(err: &AppError) -> Self {
        Self {
            error: UPSTREAM_FAILURE_TAG,
            detail: err.to_string(),
        }
    }

    fn to_payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"error":"{}","detail":""}}"#, UPSTREAM_FAILURE_TAG)
        })
    }
}

/// What came back from one model call.
enum ModelReply {
    Text(String),
    Failed(String),
}

/// Runs the profile → prompt → model → sanitizer → normalizer pipeline.
#[derive(Clone)]
pub struct AdvisorService {
    model: Arc<dyn LanguageModel>,
    generation: GenerationConfig,
    recommendation_limit: usize,
}

impl AdvisorService {
    pub fn new(model: Arc<dyn LanguageModel>, config: &Config) -> Self {
        Self {
            model,
            generation: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: config.max_output_tokens,
            },
            recommendation_limit: config.recommendation_limit,
        }
    }

    pub fn with_settings(
        model: Arc<dyn LanguageModel>,
        generation: GenerationConfig,
        recommendation_limit: usize,
    ) -> Self {
        Self {
            model,
            generation,
            recommendation_limit,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Produces a coverage recommendation for one profile.
    ///
    /// Missing keys in the model's reply are filled with defaults. A reply
    /// without any parseable object, or a failed model call, becomes
    /// `AppError::InvalidModelResponse` carrying the raw text.
    pub async fn advise(&self, profile: &ClientProfile) -> Result<CoverageResult, AppError> {
        let snapshot = ProfileSnapshot::new(profile);
        let prompt = build_prompt(&snapshot, self.recommendation_limit)?;

        tracing::info!(
            "Requesting coverage advice for age {} in {} ({})",
            profile.age,
            profile.location,
            profile.currency_or_default()
        );

        let raw = match self.chat(&prompt).await {
            ModelReply::Text(text) => text,
            ModelReply::Failed(payload) => {
                return Err(AppError::InvalidModelResponse(payload));
            }
        };

        let Some(parsed) = extract_json(&raw) else {
            tracing::error!("Model reply contained no parseable JSON object");
            return Err(AppError::InvalidModelResponse(raw));
        };

        let missing = missing_keys(&parsed);
        if !missing.is_empty() {
            tracing::warn!("Filling defaults for missing keys: {:?}", missing);
        }

        Ok(normalize(parsed, profile))
    }

    async fn chat(&self, prompt: &str) -> ModelReply {
        match self.model.generate(prompt, &self.generation).await {
            Ok(text) => ModelReply::Text(text),
            Err(err) => {
                tracing::error!("Model call failed: {}", err);
                ModelReply::Failed(UpstreamFailure::new(&err).to_payload())
            }
        }
    }
}

const RESULT_KEYS: [&str; 7] = [
    "coverage_amount",
    "coverage_currency",
    "breakdown",
    "assumptions",
    "recommendations",
    "research_notes",
    "timestamp",
];

fn missing_keys(parsed: &serde_json::Map<String, serde_json::Value>) -> Vec<&'static str> {
    RESULT_KEYS
        .iter()
        .copied()
        .filter(|key| !parsed.contains_key(*key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedModel {
        reply: Result<String, AppError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(reply: Result<String, AppError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(
            &self,
            prompt: &str,
            generation: &GenerationConfig,
        ) -> Result<String, AppError> {
            assert_eq!(generation.temperature, 0.0);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn profile() -> ClientProfile {
        ClientProfile {
            age: 35,
            annual_income: 85_000.0,
            dependents: 2,
            location: "United States".to_string(),
            total_debt: 200_000.0,
            available_savings: 50_000.0,
            existing_life_insurance: 100_000.0,
            income_replacement_years: 10,
            currency: "GBP".to_string(),
        }
    }

    fn service(model: Arc<ScriptedModel>) -> AdvisorService {
        AdvisorService::with_settings(model, GenerationConfig::default(), 5)
    }

    #[tokio::test]
    async fn fenced_partial_reply_is_normalized() {
        let model = ScriptedModel::new(Ok(
            "```json\n{\"coverage_amount\": 813520}\n```".to_string()
        ));
        let result = service(model.clone()).advise(&profile()).await.unwrap();

        assert_eq!(result.coverage_amount, json!(813520));
        assert_eq!(result.coverage_currency, json!("GBP"));
        assert_eq!(result.recommendations, json!([]));

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"currency\":\"GBP\""));
        assert!(prompts[0].contains("request_timestamp"));
    }

    #[tokio::test]
    async fn unparseable_reply_carries_raw_text() {
        let model = ScriptedModel::new(Ok("I cannot help with that.".to_string()));
        let err = service(model).advise(&profile()).await.unwrap_err();

        match err {
            AppError::InvalidModelResponse(raw) => assert_eq!(raw, "I cannot help with that."),
            other => panic!("expected InvalidModelResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_failure_becomes_structured_payload() {
        let model = ScriptedModel::new(Err(AppError::ExternalApiError("quota".into())));
        let err = service(model).advise(&profile()).await.unwrap_err();

        let AppError::InvalidModelResponse(raw) = err else {
            panic!("expected InvalidModelResponse");
        };
        let payload: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(payload["error"], UPSTREAM_FAILURE_TAG);
        assert!(payload["detail"].as_str().unwrap().contains("quota"));
    }

    #[test]
    fn missing_keys_lists_absent_fields() {
        let parsed = json!({"coverage_amount": 1, "timestamp": "t"});
        let missing = missing_keys(parsed.as_object().unwrap());
        assert_eq!(missing.len(), 5);
        assert!(!missing.contains(&"coverage_amount"));
    }
}
