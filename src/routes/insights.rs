use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::ApiError;
use crate::insights::{self, InsightsWindow};
use crate::models::InsightsSummary;

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub window: InsightsWindow,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/insights", get(get_insights))
        .with_state(state)
}

async fn get_insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsSummary>, ApiError> {
    let cycles = state.cycles.list(query.user_id).await?;
    let symptoms = state.symptoms.list(query.user_id).await?;

    Ok(Json(insights::summarize(
        &cycles,
        &symptoms,
        query.window,
        state.clock.today(),
    )))
}
