//! Cycle tracking backend: cycle and symptom storage behind a small JSON API, plus the
//! cycle predictor that turns a user's history into next-period and fertility estimates.

use axum::{routing::get, Router};

pub mod clock;
pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod prediction;
pub mod routes;
pub mod store;

pub use routes::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::cycle::routes(state.clone()))
        .merge(routes::prediction::routes(state.clone()))
        .merge(routes::symptoms::routes(state.clone()))
        .merge(routes::insights::routes(state))
        .route("/health", get(|| async { "ok" }))
}
