use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::analytics::profile::ProfileSummary;
use crate::analytics::View;
use crate::error::{DashboardError, Result};
use crate::presentation::{DashboardSection, Panel};
use crate::session::Session;
use crate::sync::{SyncOutcome, SyncReport, Syncer};

/// Shared state for the dashboard API
#[derive(Clone)]
pub struct AppState {
    pub syncer: Syncer,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(syncer: Syncer) -> Self {
        Self {
            syncer,
            start_time: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionResponse {
    pub username: String,
    pub section: DashboardSection,
    pub panels: Vec<Panel>,
}

#[derive(Debug)]
pub enum ApiError {
    Dashboard(DashboardError),
    UnknownSection(String),
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        ApiError::Dashboard(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownSection(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Dashboard(e) => {
                let status = match &e {
                    DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
                    DashboardError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                    DashboardError::Upstream { .. } | DashboardError::Network(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    DashboardError::Config(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!("Request failed: {}", e);
                }
                (status, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Create the dashboard API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users/:username/summary", get(get_summary))
        .route("/users/:username/sections/:section", get(get_section))
        .route("/users/:username/fetch", post(fetch_user))
        .route("/users/:username/refresh", post(refresh_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Dashboard API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn get_summary(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> std::result::Result<Json<View<ProfileSummary>>, ApiError> {
    let session = Session::for_user(&username);
    Ok(Json(session.summary(state.syncer.gateway()).await?))
}

async fn get_section(
    State(state): State<AppState>,
    Path((username, section)): Path<(String, String)>,
) -> std::result::Result<Json<SectionResponse>, ApiError> {
    let section: DashboardSection = section.parse().map_err(ApiError::UnknownSection)?;
    let session = Session::for_user(&username).with_section(section);

    let panels = session
        .render(state.syncer.gateway(), Utc::now())
        .await
        .unwrap_or_default();

    Ok(Json(SectionResponse {
        username,
        section,
        panels,
    }))
}

async fn fetch_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> std::result::Result<Json<SyncOutcome>, ApiError> {
    Ok(Json(state.syncer.load_or_fetch(&username).await?))
}

async fn refresh_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> std::result::Result<Json<SyncReport>, ApiError> {
    Ok(Json(state.syncer.refresh(&username).await?))
}
