use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::{AppState, UserQuery};
use crate::error::ApiError;
use crate::models::PredictionResult;
use crate::prediction;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/prediction", get(get_prediction))
        .with_state(state)
}

/// A failed fetch surfaces as an error response; an empty history is the no-data result.
async fn get_prediction(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PredictionResult>, ApiError> {
    let cycles = state.cycles.list(params.user_id).await?;
    let today = state.clock.today();

    let result = prediction::predict(&cycles, today);
    tracing::debug!(
        user_id = %params.user_id,
        cycles = cycles.len(),
        current_day = result.current_day,
        "prediction computed"
    );
    Ok(Json(result))
}
