use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::orchestrator::{AppFactory, DEFAULT_TRIAL_DAYS, FactoryError, GenerationRequest};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub factory: AppFactory,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAppRequest {
    pub app_idea: Option<String>,
    pub trial_days: Option<u32>,
    #[serde(alias = "apiKey")]
    pub claude_api_key: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(String),
    Internal { error: String, details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": msg}))).into_response()
            }
            ApiError::Internal { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": error, "details": details})),
            )
                .into_response(),
        }
    }
}

impl From<FactoryError> for ApiError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::InvalidInput => {
                ApiError::BadRequest("Descrição do app é obrigatória".to_string())
            }
            FactoryError::GenerationFailed(_) => ApiError::Internal {
                error: "Erro ao gerar código".to_string(),
                details: err.to_string(),
            },
            FactoryError::ProvisioningFailed(_) => ApiError::Internal {
                error: "Erro ao criar repositório".to_string(),
                details: err.to_string(),
            },
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/generate-app", post(generate_app))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Fábrica de Apps Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Geração de código Flutter com Claude (fallback Gemini)",
            "Criação automática de repositório no GitHub",
            "Build de APK via GitHub Actions",
            "Sistema de trial e chaves de licença"
        ]
    }))
}

async fn generate_app(
    State(state): State<SharedState>,
    payload: Result<Json<GenerateAppRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected generate-app body: {}", rejection.body_text());
        ApiError::BadRequest(format!("Corpo da requisição inválido: {}", rejection.body_text()))
    })?;

    let app_idea = req
        .app_idea
        .filter(|idea| !idea.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Descrição do app é obrigatória".to_string()))?;

    info!("Generating app: {}", app_idea);
    let request = GenerationRequest::new(app_idea)
        .with_trial_days(req.trial_days.unwrap_or(DEFAULT_TRIAL_DAYS))
        .with_caller_credential(req.claude_api_key);

    let result = state.factory.generate_app(request).await?;
    info!("App ready at {}", result.repo_url);
    Ok(Json(result))
}

/// Start the HTTP server and serve until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    let state = Arc::new(AppState {
        factory: AppFactory::from_config(&config),
    });
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Fábrica de Apps listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
