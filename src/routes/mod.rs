use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::store::{CycleStore, SymptomStore};

pub mod cycle;
pub mod insights;
pub mod prediction;
pub mod symptoms;

/// Shared handler state: the stores and the one clock every date-relative handler reads.
#[derive(Clone)]
pub struct AppState {
    pub cycles: Arc<dyn CycleStore>,
    pub symptoms: Arc<dyn SymptomStore>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}
