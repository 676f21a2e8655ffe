//! HTTP surface for the intent pipeline.
//!
//! - `GET /health`
//! - `POST /api/process-intent` with `{"message", "walletAddress"}`
//! - `GET /api/abi/{contractAddress}`

mod bootstrap;

pub use bootstrap::{
    build_abi_resolver, build_estimator, build_pipeline, builder_settings, init_tracing,
};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use yolo_config::{ServerConfig, YoloConfig};
use yolo_core::error::{PipelineError, StepBuildError};
use yolo_core::{IntentPipeline, TransactionPackage};

#[derive(Clone)]
struct AppState {
    pipeline: Arc<IntentPipeline>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessIntentRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, error: &str, details: Option<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            details,
        }),
    )
}

pub async fn run_server(config: YoloConfig, listen: SocketAddr) -> anyhow::Result<()> {
    let pipeline = Arc::new(build_pipeline(&config)?);
    let app = router(pipeline, &config.server);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context("bind server listener failed")?;
    info!(%listen, "yolo-server listening");
    axum::serve(listener, app)
        .await
        .context("server terminated with error")
}

fn router(pipeline: Arc<IntentPipeline>, server: &ServerConfig) -> Router {
    let state = AppState { pipeline };
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/process-intent", post(process_intent))
        .route("/api/abi/{contract_address}", get(get_abi))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(server.body_limit_kb * 1024));
    if server.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status":"ok"}))
}

async fn process_intent(
    State(state): State<AppState>,
    payload: Result<Json<ProcessIntentRequest>, JsonRejection>,
) -> Result<Json<TransactionPackage>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            Some(rejection.body_text()),
        )
    })?;

    let message = non_blank(request.message)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Message is required", None))?;
    let wallet_address = non_blank(request.wallet_address)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Wallet address is required", None))?;

    let package = state
        .pipeline
        .process_intent(&message, &wallet_address)
        .await
        .map_err(map_pipeline_error)?;
    Ok(Json(package))
}

async fn get_abi(
    State(state): State<AppState>,
    Path(contract_address): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let abi = state
        .pipeline
        .get_abi(&contract_address)
        .await
        .map_err(|err| {
            error!(contract = %contract_address, error = %err, "abi lookup failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch ABI",
                Some(err.to_string()),
            )
        })?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "ABI not found for the given contract",
                None,
            )
        })?;
    Ok(Json(serde_json::json!({ "abi": abi.as_json() })))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn map_pipeline_error(err: PipelineError) -> ApiError {
    let (status, error) = match &err {
        PipelineError::Classification(_) => {
            (StatusCode::BAD_GATEWAY, "Failed to understand the request")
        }
        PipelineError::Build(StepBuildError::UnsupportedAction(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "Unsupported action")
        }
        PipelineError::Build(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid request parameters",
        ),
        PipelineError::EmptyPlan(_) | PipelineError::Abi(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process your request",
        ),
    };
    api_error(status, error, Some(err.to_string()))
}
