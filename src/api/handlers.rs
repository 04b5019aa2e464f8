//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::server::AppState;
use crate::core::RatioCalculator;
use crate::error::RatioError;
use crate::narrative::{ChatSession, NarrativeClient};
use crate::types::{Analysis, AnalysisOptions, HeaderMode, RawTable, TotalAssetsPolicy};
use crate::writer::render_markdown;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler result
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn session_not_found(id: Uuid) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Session {} not found", id))
    }
}

impl From<RatioError> for ApiError {
    fn from(err: RatioError) -> Self {
        let status = match &err {
            RatioError::Structure { .. } | RatioError::MissingLineItem { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RatioError::Import(_) | RatioError::Json(_) | RatioError::Yaml(_) => {
                StatusCode::BAD_REQUEST
            }
            RatioError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            RatioError::Narrative(_) => StatusCode::BAD_GATEWAY,
            RatioError::Io(_) | RatioError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Root endpoint response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "Ratio Forge API Server".to_string(),
        version: state.version.clone(),
        description: "Balance-sheet growth, composition and current ratio analysis".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint("/api/v1/analyze", "POST", "Analyze a table without a session"),
            endpoint("/api/v1/sessions", "POST", "Create a session"),
            endpoint("/api/v1/sessions/:id", "GET", "Get session analysis and history"),
            endpoint("/api/v1/sessions/:id", "DELETE", "Delete a session"),
            endpoint("/api/v1/sessions/:id/table", "POST", "Analyze a table into the session"),
            endpoint("/api/v1/sessions/:id/commentary", "POST", "Narrative commentary"),
            endpoint("/api/v1/sessions/:id/messages", "POST", "Ask a follow-up question"),
        ],
    }))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub narrative_enabled: bool,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        narrative_enabled: state.narrator.is_some(),
    }))
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub total_assets_policy: TotalAssetsPolicy,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        total_assets_policy: state.options.policy,
    }))
}

/// Table upload: rows of `[label, prior, current, ...]`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Must match the deployment policy when given
    #[serde(default)]
    pub policy: Option<TotalAssetsPolicy>,
    #[serde(default)]
    pub header: Option<HeaderMode>,
}

impl AnalyzeRequest {
    /// The deployment policy applies to every request; `policy` may only restate it
    fn options(&self, defaults: AnalysisOptions) -> Result<AnalysisOptions, ApiError> {
        if let Some(policy) = self.policy {
            if policy != defaults.policy {
                return Err(ApiError::new(
                    StatusCode::BAD_REQUEST,
                    format!(
                        "This server runs the '{}' total-assets policy; '{}' was requested",
                        defaults.policy, policy
                    ),
                ));
            }
        }
        Ok(AnalysisOptions {
            policy: defaults.policy,
            header: self.header.unwrap_or(defaults.header),
        })
    }

    fn run(&self, defaults: AnalysisOptions) -> Result<Analysis, ApiError> {
        let options = self.options(defaults)?;
        let raw = RawTable::from_json_rows(&self.rows);
        Ok(RatioCalculator::new(options).analyze(&raw)?)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: Analysis,
    pub markdown: String,
}

impl From<Analysis> for AnalysisResponse {
    fn from(analysis: Analysis) -> Self {
        let markdown = render_markdown(&analysis.table);
        Self { analysis, markdown }
    }
}

/// POST /api/v1/analyze - Stateless analysis
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalysisResponse> {
    let analysis = req.run(state.options)?;
    Ok(Json(ApiResponse::ok(analysis.into())))
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// POST /api/v1/sessions - Create a session
pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.sessions.create().await;
    info!(%session_id, "session created");
    (
        StatusCode::CREATED,
        Json(ApiResponse::ok(SessionCreated { session_id })),
    )
}

/// GET /api/v1/sessions/:id - Session snapshot
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<ChatSession> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?;
    Ok(Json(ApiResponse::ok(session)))
}

#[derive(Debug, Serialize)]
pub struct SessionDeleted {
    pub session_id: Uuid,
}

/// DELETE /api/v1/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionDeleted> {
    if !state.sessions.remove(id).await {
        return Err(ApiError::session_not_found(id));
    }
    info!(session_id = %id, "session deleted");
    Ok(Json(ApiResponse::ok(SessionDeleted { session_id: id })))
}

/// POST /api/v1/sessions/:id/table - Analyze and store in the session
pub async fn upload_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalysisResponse> {
    if state.sessions.get(id).await.is_none() {
        return Err(ApiError::session_not_found(id));
    }
    let analysis = req.run(state.options)?;
    state
        .sessions
        .update(id, |s| s.load_analysis(analysis.clone()))
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?;
    Ok(Json(ApiResponse::ok(analysis.into())))
}

fn narrator(state: &AppState) -> Result<Arc<dyn NarrativeClient>, ApiError> {
    state.narrator.clone().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Narrative generation is not configured on this server",
        )
    })
}

async fn require_analysis(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?;
    if session.analysis.is_none() {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "Upload a table to this session before requesting commentary or chat",
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CommentaryResponse {
    pub text: String,
}

/// POST /api/v1/sessions/:id/commentary - Narrative commentary on the session's table
pub async fn commentary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<CommentaryResponse> {
    let client = narrator(&state)?;
    require_analysis(&state, id).await?;

    let request = state
        .sessions
        .update(id, |s| s.commentary_request())
        .await
        .ok_or_else(|| ApiError::session_not_found(id))??;

    let text = client.generate(&request).await.map_err(|e| {
        warn!(session_id = %id, error = %e, "commentary failed");
        ApiError::from(e)
    })?;
    Ok(Json(ApiResponse::ok(CommentaryResponse { text })))
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub history_len: usize,
}

/// POST /api/v1/sessions/:id/messages - Follow-up question
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<QuestionRequest>,
) -> ApiResult<AnswerResponse> {
    let client = narrator(&state)?;
    if req.question.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "question must not be empty"));
    }
    require_analysis(&state, id).await?;

    let request = state
        .sessions
        .update(id, |s| s.question_request(&req.question))
        .await
        .ok_or_else(|| ApiError::session_not_found(id))??;

    let answer = client.generate(&request).await.map_err(|e| {
        warn!(session_id = %id, error = %e, "chat request failed");
        ApiError::from(e)
    })?;

    let history_len = state
        .sessions
        .update(id, |s| {
            s.record_exchange(req.question.clone(), answer.clone());
            s.history.len()
        })
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?;

    Ok(Json(ApiResponse::ok(AnswerResponse {
        answer,
        history_len,
    })))
}
