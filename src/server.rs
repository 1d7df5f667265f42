//! HTTP API
//!
//! Endpoints:
//! - `GET  /health`
//! - `GET  /api/graph?owner=<o>&name=<n>&folder=<f>`
//! - `GET  /api/parse/test?owner=<o>&name=<n>&path=<p>`
//! - `GET  /api/file?owner=<o>&name=<n>&path=<p>`
//! - `POST /api/repo/clone` with `{"repoUrl": "...", "folder": "..."}`
//! - `DELETE /api/repo?owner=<o>&name=<n>`
//!
//! Errors are returned as `{"error": "<message>"}`. Graph building and cloning
//! are blocking work and run on tokio's blocking pool.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::GraphError;
use crate::graph::GraphBuilder;
use crate::models::{GraphResponse, ParseReport};
use crate::parsers::{ImportParser, SourceParser};
use crate::repo::{parse_github_url, RepoInfo, RepoStore};

/// Server state shared across requests
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn store(&self) -> RepoStore {
        RepoStore::new(&self.config.repos_dir)
    }
}

/// JSON error body plus status
pub type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: message.into() }))
}

/// 404 for missing repositories/folders/files, `fallback` otherwise
fn classify_error(err: &anyhow::Error, fallback: StatusCode) -> ApiError {
    let not_found = err
        .downcast_ref::<GraphError>()
        .map(GraphError::is_not_found)
        .unwrap_or(false)
        || err
            .root_cause()
            .downcast_ref::<std::io::Error>()
            .map(|e| e.kind() == std::io::ErrorKind::NotFound)
            .unwrap_or(false);

    let status = if not_found { StatusCode::NOT_FOUND } else { fallback };
    api_error(status, format!("{:#}", err))
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| anyhow::anyhow!("Background task failed: {}", e))?
}

/// Query parameters for `GET /api/graph`
#[derive(Debug, Default, Deserialize)]
pub struct GraphParams {
    pub owner: Option<String>,
    pub name: Option<String>,
    pub folder: Option<String>,
}

/// Query parameters for endpoints addressing one file
#[derive(Debug, Default, Deserialize)]
pub struct FileParams {
    pub owner: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
}

/// Query parameters for `DELETE /api/repo`
#[derive(Debug, Default, Deserialize)]
pub struct RepoParams {
    pub owner: Option<String>,
    pub name: Option<String>,
}

/// Body of `POST /api/repo/clone`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    pub repo_url: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CloneResponse {
    pub message: String,
    pub data: RepoInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileContent {
    pub owner: String,
    pub name: String,
    pub path: String,
    pub content: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK", "message": "Server is running" }))
}

pub async fn handle_graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> Result<Json<GraphResponse>, ApiError> {
    let (Some(owner), Some(name)) = (non_empty(params.owner), non_empty(params.name)) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "owner and name query parameters are required",
        ));
    };
    let folder = non_empty(params.folder);

    let response = run_blocking(move || {
        GraphBuilder::from_config(&state.config).build_response(&owner, &name, folder.as_deref())
    })
    .await
    .map_err(|e| {
        log::error!("Graph build failed: {:#}", e);
        classify_error(&e, StatusCode::INTERNAL_SERVER_ERROR)
    })?;

    Ok(Json(response))
}

fn require_file_params(params: FileParams) -> Result<(String, String, String), ApiError> {
    match (non_empty(params.owner), non_empty(params.name), non_empty(params.path)) {
        (Some(owner), Some(name), Some(path)) => Ok((owner, name, path)),
        _ => Err(api_error(
            StatusCode::BAD_REQUEST,
            "owner, name, and path query parameters are required",
        )),
    }
}

pub async fn handle_parse_test(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> Result<Json<ParseReport>, ApiError> {
    let (owner, name, path) = require_file_params(params)?;

    let report = run_blocking(move || {
        let content = state.store().read_file(&owner, &name, &path)?;
        let imports = SourceParser::new().parse_imports(&path, &content)?;
        Ok(ParseReport::new(path, imports))
    })
    .await
    .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("{:#}", e)))?;

    Ok(Json(report))
}

pub async fn handle_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> Result<Json<FileContent>, ApiError> {
    let (owner, name, path) = require_file_params(params)?;

    let content = run_blocking(move || {
        let content = state.store().read_file(&owner, &name, &path)?;
        Ok(FileContent { owner, name, path, content })
    })
    .await
    .map_err(|e| classify_error(&e, StatusCode::BAD_REQUEST))?;

    Ok(Json(content))
}

pub async fn handle_clone(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CloneRequest>,
) -> Result<Json<CloneResponse>, ApiError> {
    let Some(repo_url) = non_empty(request.repo_url) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "repoUrl is required"));
    };
    if parse_github_url(&repo_url).is_none() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid GitHub URL"));
    }
    let folder = non_empty(request.folder);

    log::info!("Clone request: {} ({})", repo_url, folder.as_deref().unwrap_or("entire repo"));

    let info = run_blocking(move || state.store().clone_repo(&repo_url, folder.as_deref()))
        .await
        .map_err(|e| {
            log::error!("Clone failed: {:#}", e);
            classify_error(&e, StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    let message = match &info.analyzed_folder {
        Some(folder) => format!("Repository cloned successfully (analyzing folder: /{})", folder),
        None => "Repository cloned successfully".to_string(),
    };

    Ok(Json(CloneResponse { message, data: info }))
}

pub async fn handle_delete_repo(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RepoParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(owner), Some(name)) = (non_empty(params.owner), non_empty(params.name)) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "owner and name query parameters are required",
        ));
    };

    let (owner, name, deleted) = run_blocking(move || {
        let deleted = state.store().delete(&owner, &name)?;
        Ok((owner, name, deleted))
    })
    .await
    .map_err(|e| classify_error(&e, StatusCode::BAD_REQUEST))?;

    if !deleted {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Repository not found: {}/{}", owner, name),
        ));
    }

    Ok(Json(serde_json::json!({ "message": format!("Repository {}/{} deleted", owner, name) })))
}

/// Build the router with CORS open to any origin
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/graph", get(handle_graph))
        .route("/api/parse/test", get(handle_parse_test))
        .route("/api/file", get(handle_file))
        .route("/api/repo/clone", post(handle_clone))
        .route("/api/repo", delete(handle_delete_repo))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn run_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
