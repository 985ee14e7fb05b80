//! Throwaway HTTP stubs for backend tests

use axum::Router;
use lucid_domain::{ApiKey, ExpectedShape, LearningMode, PromptSpec, ProviderConfig, ProviderKind};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL
pub(crate) async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Config pointing a backend at a stub server
pub(crate) fn stub_config(kind: ProviderKind, base_url: &str) -> ProviderConfig {
    ProviderConfig::new(kind, ApiKey::new("test-key"), "test-model")
        .with_base_url(base_url)
        .with_timeout_ms(5_000)
}

/// A minimal prompt
pub(crate) fn stub_prompt() -> PromptSpec {
    PromptSpec {
        system_text: "You are a patient tutor.".to_string(),
        instruction_text: "Explain recursion.".to_string(),
        expected_shape: ExpectedShape::for_mode(LearningMode::Beginner),
    }
}
