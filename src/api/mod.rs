use axum::Json;
use axum::extract::Path;
use axum::response::Html;
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Local;
use serde::Serialize;

use crate::error::AppError;
use crate::models::*;
use crate::repository;
use crate::services::SyncStatus;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
struct AssignmentList {
    assignments: Vec<Assignment>,
}

#[derive(Debug, Serialize)]
struct SyncAccepted {
    ok: bool,
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/assignments", get(list_assignments).post(create_assignment))
        .route(
            "/api/assignments/{id}",
            patch(update_assignment).delete(delete_assignment),
        )
        .route("/api/sync", post(sync_now))
        .route("/api/sync-status", get(sync_status))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.load().await?;
    Ok(StatusCode::OK)
}

async fn list_assignments(State(state): State<AppState>) -> Result<Json<AssignmentList>, AppError> {
    let assignments = repository::fetch_assignments(&state.store).await?;
    Ok(Json(AssignmentList { assignments }))
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(req): Json<NewAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = repository::insert_assignment(&state.store, req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = repository::update_assignment(&state.store, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_assignment(&state.store, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn sync_now(State(state): State<AppState>) -> Result<(StatusCode, Json<SyncAccepted>), AppError> {
    let runner = state.sync.as_ref().ok_or_else(|| {
        AppError::Config("Canvas is not configured, set CANVAS_URL and CANVAS_TOKEN".to_string())
    })?;
    runner.trigger(Local::now().date_naive())?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SyncAccepted {
            ok: true,
            message: "Sync started",
        }),
    ))
}

async fn sync_status(State(state): State<AppState>) -> Json<SyncStatus> {
    let status = state
        .sync
        .as_ref()
        .map(|runner| runner.status())
        .unwrap_or_default();
    Json(status)
}
