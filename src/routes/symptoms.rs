use axum::{
    Router,
    routing::{get, patch, post},
    extract::{State, Query, Path},
    Json,
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use std::collections::BTreeMap;

use super::{AppState, UserQuery};
use crate::error::ApiError;
use crate::insights;
use crate::models::{NewSymptom, Symptom, SymptomStats, SymptomUpdate, SymptomsByDate};

#[derive(Debug, Deserialize)]
pub struct CreateSymptom {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub symptom: NewSymptom,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub user_id: Uuid,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub user_id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/symptom", post(log_symptom))
        .route("/symptom/:id", patch(update_symptom).delete(delete_symptom))
        .route("/symptoms", get(get_symptoms_grouped))
        .route("/symptoms/on", get(get_symptoms_on))
        .route("/symptoms/stats", get(get_symptom_stats))
        .route("/symptom/all", get(get_symptoms_flat))
        .with_state(state)
}

async fn log_symptom(
    State(state): State<AppState>,
    Json(body): Json<CreateSymptom>,
) -> Result<(StatusCode, Json<Symptom>), ApiError> {
    if body.symptom.symptom_type.trim().is_empty() {
        return Err(ApiError::BadRequest("symptom_type must not be empty".into()));
    }

    let symptom = state.symptoms.append(body.user_id, body.symptom).await?;
    tracing::info!(user_id = %symptom.user_id, symptom = %symptom.symptom_type, "symptom logged");
    Ok((StatusCode::CREATED, Json(symptom)))
}

async fn update_symptom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SymptomUpdate>,
) -> Result<Json<Symptom>, ApiError> {
    if matches!(&body.symptom_type, Some(kind) if kind.trim().is_empty()) {
        return Err(ApiError::BadRequest("symptom_type must not be empty".into()));
    }

    let symptom = state.symptoms.update(id, body).await?;
    tracing::info!(symptom_id = %id, "symptom updated");
    Ok(Json(symptom))
}

async fn get_symptom_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<SymptomStats>, ApiError> {
    if query.end < query.start {
        return Err(ApiError::BadRequest("end must not be before start".into()));
    }

    let symptoms = state.symptoms.list(query.user_id).await?;
    Ok(Json(insights::symptom_stats(&symptoms, query.start, query.end)))
}

async fn delete_symptom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.symptoms.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_symptoms_flat(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Symptom>>, ApiError> {
    Ok(Json(state.symptoms.list(query.user_id).await?))
}

async fn get_symptoms_on(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<Symptom>>, ApiError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("Invalid date format (expected YYYY-MM-DD)".into()))?;

    Ok(Json(state.symptoms.list_on(query.user_id, date).await?))
}

async fn get_symptoms_grouped(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<SymptomsByDate>>, ApiError> {
    let rows = state.symptoms.list(query.user_id).await?;

    let mut map = BTreeMap::<NaiveDate, Vec<String>>::new();
    for row in rows {
        map.entry(row.logged_at)
            .or_default()
            .push(row.symptom_type);
    }

    let result: Vec<SymptomsByDate> = map
        .into_iter()
        .rev()
        .map(|(logged_at, symptoms)| SymptomsByDate { logged_at, symptoms })
        .collect();

    Ok(Json(result))
}
