use crate::config::AppConfig;
use crate::data::{SolutionView, SolveRequest, SolveResponse, TeacherId};
use crate::error::ScheduleError;
use crate::service;
use crate::store::SolutionStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shared by every request for the lifetime of the process.
pub struct AppState {
    pub config: AppConfig,
    pub store: SolutionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = SolutionStore::new(config.store.max_solutions);
        Self { config, store }
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let status = match &self {
            ScheduleError::ConfigurationConflict { .. } => StatusCode::CONFLICT,
            ScheduleError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ScheduleError::NotFound(_) => StatusCode::NOT_FOUND,
            ScheduleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct TimetableQuery {
    solution_id: Uuid,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    cleared: usize,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn solve_handler(
    State(state): State<SharedState>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ScheduleError> {
    // the solve blocks for up to the time budget
    let response = tokio::task::spawn_blocking(move || {
        service::solve_and_store(&request, &state.config, &state.store)
    })
    .await
    .map_err(|e| ScheduleError::Internal(format!("solve task failed: {}", e)))??;
    Ok(Json(response))
}

async fn solution_handler(
    State(state): State<SharedState>,
    Path(solution_id): Path<Uuid>,
) -> Result<Json<SolutionView>, ScheduleError> {
    state.store.view(&solution_id).map(Json)
}

async fn teacher_timetable_handler(
    State(state): State<SharedState>,
    Path(teacher_id): Path<TeacherId>,
    Query(query): Query<TimetableQuery>,
) -> Result<Json<SolutionView>, ScheduleError> {
    state
        .store
        .view_for_teacher(&query.solution_id, teacher_id)
        .map(Json)
}

async fn clear_handler(State(state): State<SharedState>) -> Json<ClearResponse> {
    Json(ClearResponse {
        cleared: state.store.clear(),
    })
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/optimize/solve", post(solve_handler))
        .route("/api/optimize/solution/:solution_id", get(solution_handler))
        .route("/api/optimize/solutions", delete(clear_handler))
        .route(
            "/api/teacher/timetable/:teacher_id",
            get(teacher_timetable_handler),
        )
        .with_state(state)
}

pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let address = config.server_address();
    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
