use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Missing or invalid configuration (API credential, base URL, ...).
    ConfigurationError(String),
    /// Request body failed to deserialize into the expected type.
    InvalidRequest(String),
    /// Error interacting with the language-model API.
    ExternalApiError(String),
    /// The model reply did not contain a parseable JSON object.
    ///
    /// Carries the raw reply text so callers can diagnose it.
    InvalidModelResponse(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InvalidModelResponse(raw) => write!(f, "Invalid Gemini response: {}", raw),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and a `{"detail": ...}` body.
    ///
    /// An unparseable model reply is returned verbatim in `detail` to aid debugging.
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Advisor is not configured".to_string(),
                )
            }
            AppError::InvalidRequest(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::InvalidModelResponse(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return (**source).clone().into_response();
            }
        };

        let body = Json(json!({
            "detail": detail,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization failed: {}", err))
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_model_response_keeps_raw_text() {
        let err = AppError::InvalidModelResponse("not json at all".to_string());
        assert_eq!(err.to_string(), "Invalid Gemini response: not json at all");
    }

    #[test]
    fn status_codes_per_variant() {
        let cases = [
            (
                AppError::InvalidRequest("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::ExternalApiError("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::InvalidModelResponse("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::ConfigurationError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn context_wraps_and_delegates_status() {
        let result: Result<(), AppError> =
            Err(AppError::InvalidModelResponse("oops".into()));
        let err = result.context("POST /advise").unwrap_err();

        assert_eq!(err.to_string(), "POST /advise: Invalid Gemini response: oops");
        assert!(matches!(
            &err,
            AppError::WithContext { source, .. } if matches!(**source, AppError::InvalidModelResponse(_))
        ));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn context_keeps_inner_detail_in_body() {
        let result: Result<(), AppError> =
            Err(AppError::InvalidModelResponse("oops".into()));
        let response = result.context("POST /advise").unwrap_err().into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Invalid Gemini response: oops");
    }
}
