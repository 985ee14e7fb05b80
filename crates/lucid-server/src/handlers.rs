//! HTTP request handlers for the Lucid server.
//!
//! `POST /api/explain` runs the explanation pipeline and `GET /health`
//! reports liveness. Every response body is JSON; failures use the same
//! envelope regardless of which stage produced them.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use lucid_domain::{ClassifiedError, ErrorCode, ErrorKind, LearningResponse, RequestId};
use lucid_explainer::Explainer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline shared by all requests
    pub explainer: Arc<Explainer>,
}

impl AppState {
    /// Wrap an explainer for sharing across handlers
    pub fn new(explainer: Explainer) -> Self {
        Self {
            explainer: Arc::new(explainer),
        }
    }
}

/// Explain request body
///
/// Missing `input` or `mode` fields are read as empty strings so the
/// validator reports them with its own codes.
#[derive(Debug, Default, Deserialize)]
pub struct ExplainRequest {
    /// Text to explain
    #[serde(default)]
    pub input: String,
    /// Learning mode
    #[serde(default)]
    pub mode: String,
    /// Optional topic type, inferred when absent
    #[serde(default)]
    pub topic_type: Option<String>,
}

/// Successful explain response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    /// Always `true`
    pub success: bool,
    /// Formatted learning content
    pub data: LearningResponse,
}

/// Failed request envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Classified error
    pub error: ClassifiedError,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Liveness status
    pub status: String,
    /// Server version
    pub version: String,
}

/// Application error type
#[derive(Debug)]
pub struct AppError(pub ClassifiedError);

impl From<ClassifiedError> for AppError {
    fn from(e: ClassifiedError) -> Self {
        AppError(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ClassifiedError::with_detail(
            ErrorCode::InvalidRequest,
            rejection.body_text(),
        ))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorResponse {
            success: false,
            error: self.0,
        });
        (status, body).into_response()
    }
}

fn log_failure(e: &ClassifiedError) {
    let detail = e.detail.as_deref().unwrap_or("");
    match e.kind {
        ErrorKind::System => error!(code = %e.qualified_code(), detail, "Request failed"),
        _ => warn!(code = %e.qualified_code(), detail, "Request failed"),
    }
}

/// POST /api/explain - Explain a concept or code snippet
async fn explain(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> Result<Json<ExplainResponse>, AppError> {
    let request_id = RequestId::new();
    let span = info_span!("explain", %request_id);

    async move {
        let result = match payload {
            Ok(Json(request)) => {
                state
                    .explainer
                    .explain(&request.input, &request.mode, request.topic_type.as_deref())
                    .await
            }
            Err(rejection) => Err(AppError::from(rejection).0),
        };

        match result {
            Ok(data) => {
                info!(processing_time_ms = data.processing_time_ms, "Request completed");
                Ok(Json(ExplainResponse {
                    success: true,
                    data,
                }))
            }
            Err(e) => {
                log_failure(&e);
                Err(AppError(e))
            }
        }
    }
    .instrument(span)
    .await
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/explain", post(explain))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use lucid_domain::{ApiKey, ProviderConfig, ProviderKind};
    use lucid_explainer::ExplainerConfig;
    use lucid_gatekeeper::Gatekeeper;
    use lucid_llm::{MockProvider, ProviderAdapter};
    use tower::ServiceExt; // for oneshot

    fn create_test_state(llm: &MockProvider) -> AppState {
        let provider = ProviderConfig::new(ProviderKind::Ollama, ApiKey::default(), "llama3");
        AppState::new(Explainer::new(
            Gatekeeper::default_config(),
            ProviderAdapter::new(Arc::new(llm.clone())),
            Arc::new(provider),
            ExplainerConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(&MockProvider::default()));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_explain_validation_error_status() {
        let llm = MockProvider::default();
        let app = create_router(create_test_state(&llm));

        let request = Request::builder()
            .method("POST")
            .uri("/api/explain")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"input": "recursion", "mode": "expert"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_error_status_follows_code() {
        let err = AppError::from(ClassifiedError::new(ErrorCode::Timeout));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
