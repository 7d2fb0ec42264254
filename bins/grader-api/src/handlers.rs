// HTTP route handlers for the grader API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use grader_common::types::{Language, ProblemSignature, TestCase};
use grader_engine::{GradeError, TransportError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::feedback::{self, FeedbackRequest};
use crate::AppState;

/// Request-level failure rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<GradeError> for ApiError {
    fn from(err: GradeError) -> Self {
        let status = match &err {
            GradeError::UnsupportedLanguage(_)
            | GradeError::UnresolvedSignature(_) => StatusCode::BAD_REQUEST,
            GradeError::Transport(TransportError::MissingCredentials) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GradeError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub code: Option<String>,
    pub language: Option<String>,
    pub test_cases: Option<Vec<TestCase>>,
    pub signature: Option<String>,
}

/// POST /execute - Grade a submission against its test cases
pub async fn execute(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let (code, test_cases) = match (request.code, request.test_cases) {
        (Some(code), Some(test_cases)) if !code.trim().is_empty() => (code, test_cases),
        _ => return Err(ApiError::bad_request("Code and test cases are required")),
    };

    let language = request
        .language
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Language is required"))?
        .parse::<Language>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let signature = request
        .signature
        .as_deref()
        .map(str::parse::<ProblemSignature>)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    match state.grader.run(&code, language, signature, &test_cases).await {
        Ok(report) => {
            info!(
                language = %language,
                passed = report.passed,
                total = report.total,
                "Submission graded"
            );
            Ok((StatusCode::OK, Json(report)).into_response())
        }
        Err(e) => {
            match &e {
                GradeError::Transport(_) => error!(language = %language, error = %e, "Grading aborted"),
                _ => warn!(language = %language, error = %e, "Grading request rejected"),
            }
            Err(e.into())
        }
    }
}

/// POST /feedback - Coaching text for a graded submission
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => {
            warn!(error = %e.body_text(), "Malformed feedback request");
            return Json(serde_json::json!({ "feedback": feedback::FALLBACK_FEEDBACK }));
        }
    };

    let text = feedback::generate(state.feedback.as_deref(), &request).await;
    Json(serde_json::json!({ "feedback": text }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
