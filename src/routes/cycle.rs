use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{AppState, UserQuery};
use crate::error::ApiError;
use crate::models::{CycleRecord, CycleUpdate, NewCycle};

#[derive(Debug, Deserialize)]
pub struct CreateCycle {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub cycle: NewCycle,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/cycles", get(list_cycles))
        .route("/cycles/current", get(current_cycle))
        .route("/cycle", post(create_cycle))
        .route("/cycle/:id", patch(update_cycle).delete(delete_cycle))
        .with_state(state)
}

fn validate(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
    length: Option<i32>,
) -> Result<(), ApiError> {
    if matches!(length, Some(l) if l <= 0) {
        return Err(ApiError::BadRequest("length must be a positive number of days".into()));
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ApiError::BadRequest("end must not be before start".into()));
        }
    }
    Ok(())
}

async fn list_cycles(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<CycleRecord>>, ApiError> {
    let cycles = state.cycles.list(params.user_id).await?;
    Ok(Json(cycles))
}

async fn current_cycle(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<CycleRecord>, ApiError> {
    state
        .cycles
        .current(params.user_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_cycle(
    State(state): State<AppState>,
    Json(body): Json<CreateCycle>,
) -> Result<(StatusCode, Json<CycleRecord>), ApiError> {
    validate(Some(body.cycle.start), body.cycle.end, body.cycle.length)?;

    let record = state.cycles.append(body.user_id, body.cycle).await?;
    tracing::info!(user_id = %record.user_id, cycle_id = %record.id, "cycle created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_cycle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CycleUpdate>,
) -> Result<Json<CycleRecord>, ApiError> {
    validate(body.start, body.end, body.length)?;

    let record = state.cycles.update(id, body).await?;
    tracing::info!(cycle_id = %id, "cycle updated");
    Ok(Json(record))
}

async fn delete_cycle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.cycles.remove(id).await?;
    tracing::info!(cycle_id = %id, "cycle deleted");
    Ok(StatusCode::NO_CONTENT)
}
