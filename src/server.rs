//! HTTP API for scanning folders and generating documentation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use agentdoc_gen::{ChatClient, DocGenerator, GenerateError};
use agentdoc_scan::{FileManifest, ScanError, scan_folder};

/// Shared state for request handlers.
pub struct AppState {
    generator: Option<DocGenerator<ChatClient>>,
}

impl AppState {
    /// Create state; without a generator `/api/generate` answers 503.
    pub fn new(generator: Option<DocGenerator<ChatClient>>) -> Self {
        Self { generator }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scan", post(scan_handler))
        .route("/api/generate", post(generate_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Serve the API on `addr` until the process is interrupted.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("agentdoc API listening on {}", addr);
    eprintln!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("API server failed")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanRequest {
    folder_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    folder_path: Option<String>,
    manifest: Option<FileManifest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    success: bool,
    file_path: PathBuf,
    message: String,
}

/// Error response carrying a status and a JSON `{ "error" }` body.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        let status = match &err {
            ScanError::NotFound { .. } => StatusCode::NOT_FOUND,
            ScanError::NotADirectory { .. } | ScanError::InvalidConfig { .. } => {
                StatusCode::BAD_REQUEST
            }
            ScanError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ScanError::Io { .. } | ScanError::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Scan(scan) => scan.into(),
            GenerateError::MissingApiKey => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

/// Reject missing or blank string fields.
fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, message))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn scan_handler(
    State(_state): State<Arc<AppState>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<FileManifest>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected scan body: {}", rejection.body_text());
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid folderPath provided")
    })?;
    let folder_path = required(request.folder_path, "Invalid folderPath provided")?;
    tracing::debug!("Scanning {}", folder_path);

    let result = tokio::task::spawn_blocking(move || scan_folder(folder_path))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok(manifest) => Ok(Json(manifest)),
        Err(err) => {
            tracing::error!("Scan error: {}", err);
            Err(err.into())
        }
    }
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;
    let folder_path = required(request.folder_path, "Missing folderPath or manifest")?;
    let manifest = request
        .manifest
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Missing folderPath or manifest"))?;

    let generator = state.generator.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "No language model configured",
        )
    })?;

    let folder = Path::new(&folder_path);
    let is_dir = tokio::fs::metadata(folder)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Folder not found: {folder_path}"),
        ));
    }

    match generator.generate_and_write(folder, &manifest).await {
        Ok(file_path) => Ok(Json(GenerateResponse {
            success: true,
            file_path,
            message: "Documentation generated successfully".to_string(),
        })),
        Err(err) => {
            tracing::error!("Generation error: {}", err);
            Err(err.into())
        }
    }
}
