//! Persistence for cycles and symptom logs.
//!
//! Handlers only see the [`CycleStore`] and [`SymptomStore`] traits; [`PgStore`] backs
//! them with Postgres and [`MemoryStore`] keeps everything in process.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{CycleRecord, CycleUpdate, NewCycle, NewSymptom, Symptom, SymptomUpdate};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub const OPEN_CYCLE_CONFLICT: &str = "user already has an ongoing cycle";

/// Reject a cycle whose end falls before its start, as stored after an update.
pub(crate) fn check_dates(record: &CycleRecord) -> Result<(), StoreError> {
    match record.end {
        Some(end) if end < record.start => {
            Err(StoreError::Invalid("end must not be before start".into()))
        }
        _ => Ok(()),
    }
}

#[async_trait]
pub trait CycleStore: Send + Sync {
    /// All cycles of a user, newest `start` first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<CycleRecord>, StoreError>;

    /// Insert a cycle. A second open cycle (no `end`) for the same user is a conflict.
    async fn append(&self, user_id: Uuid, cycle: NewCycle) -> Result<CycleRecord, StoreError>;

    /// Merge `update` into the stored cycle. The merged record must still end on or
    /// after its start.
    async fn update(&self, id: Uuid, update: CycleUpdate) -> Result<CycleRecord, StoreError>;

    async fn remove(&self, id: Uuid) -> Result<(), StoreError>;

    /// The newest cycle without an end date, if any.
    async fn current(&self, user_id: Uuid) -> Result<Option<CycleRecord>, StoreError>;
}

#[async_trait]
pub trait SymptomStore: Send + Sync {
    /// All symptoms of a user, most recent first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Symptom>, StoreError>;

    async fn list_on(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<Symptom>, StoreError>;

    async fn append(&self, user_id: Uuid, symptom: NewSymptom) -> Result<Symptom, StoreError>;

    async fn update(&self, id: Uuid, update: SymptomUpdate) -> Result<Symptom, StoreError>;

    async fn remove(&self, id: Uuid) -> Result<(), StoreError>;
}
