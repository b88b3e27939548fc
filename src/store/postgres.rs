use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{check_dates, CycleStore, StoreError, SymptomStore, OPEN_CYCLE_CONFLICT};
use crate::models::{CycleRecord, CycleUpdate, NewCycle, NewSymptom, Symptom, SymptomUpdate};

const CYCLE_COLUMNS: &str =
    "id, user_id, start_date, end_date, length_days, ovulation_date, notes, created_at";
const SYMPTOM_COLUMNS: &str = "id, user_id, logged_at, symptom_type, intensity, notes";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Log the database error and classify it; constraint violations become conflicts.
fn classify(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        tracing::error!("❌ DB query failed: {}", db_err.message());

        if let Some(code) = db_err.code() {
            tracing::info!("ℹ️ SQLSTATE code: {}", code);
        }

        if let Some(constraint) = db_err.constraint() {
            tracing::info!("🔒 Constraint violated: {}", constraint);
            return StoreError::Conflict(format!("constraint {constraint} violated"));
        }
    } else {
        tracing::error!("❌ Unknown DB error: {}", e);
    }

    StoreError::Database(e)
}

#[async_trait]
impl CycleStore for PgStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<CycleRecord>, StoreError> {
        let sql = format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles WHERE user_id = $1 ORDER BY start_date DESC"
        );
        sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn append(&self, user_id: Uuid, cycle: NewCycle) -> Result<CycleRecord, StoreError> {
        if cycle.end.is_none() && self.current(user_id).await?.is_some() {
            tracing::info!(%user_id, "refusing second open cycle");
            return Err(StoreError::Conflict(OPEN_CYCLE_CONFLICT.into()));
        }

        let sql = format!(
            "INSERT INTO cycles (id, user_id, start_date, end_date, length_days, ovulation_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CYCLE_COLUMNS}"
        );
        sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(cycle.start)
            .bind(cycle.end)
            .bind(cycle.length)
            .bind(cycle.ovulation_date)
            .bind(cycle.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update(&self, id: Uuid, update: CycleUpdate) -> Result<CycleRecord, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let select = format!("SELECT {CYCLE_COLUMNS} FROM cycles WHERE id = $1 FOR UPDATE");
        let mut record = sqlx::query_as::<_, CycleRecord>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound)?;

        update.apply(&mut record);
        check_dates(&record)?;

        let sql = format!(
            "UPDATE cycles SET
                start_date = $2,
                end_date = $3,
                length_days = $4,
                ovulation_date = $5,
                notes = $6
             WHERE id = $1
             RETURNING {CYCLE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(id)
            .bind(record.start)
            .bind(record.end)
            .bind(record.length)
            .bind(record.ovulation_date)
            .bind(record.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(updated)
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cycles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn current(&self, user_id: Uuid) -> Result<Option<CycleRecord>, StoreError> {
        let sql = format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles
             WHERE user_id = $1 AND end_date IS NULL
             ORDER BY start_date DESC LIMIT 1"
        );
        sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl SymptomStore for PgStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Symptom>, StoreError> {
        let sql = format!(
            "SELECT {SYMPTOM_COLUMNS} FROM symptom_logs WHERE user_id = $1 ORDER BY logged_at DESC"
        );
        sqlx::query_as::<_, Symptom>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn list_on(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<Symptom>, StoreError> {
        let sql = format!(
            "SELECT {SYMPTOM_COLUMNS} FROM symptom_logs WHERE user_id = $1 AND logged_at = $2"
        );
        sqlx::query_as::<_, Symptom>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn append(&self, user_id: Uuid, symptom: NewSymptom) -> Result<Symptom, StoreError> {
        let sql = format!(
            "INSERT INTO symptom_logs (id, user_id, logged_at, symptom_type, intensity, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SYMPTOM_COLUMNS}"
        );
        sqlx::query_as::<_, Symptom>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(symptom.logged_at)
            .bind(symptom.symptom_type)
            .bind(symptom.intensity)
            .bind(symptom.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update(&self, id: Uuid, update: SymptomUpdate) -> Result<Symptom, StoreError> {
        let sql = format!(
            "UPDATE symptom_logs SET
                logged_at = COALESCE($2, logged_at),
                symptom_type = COALESCE($3, symptom_type),
                intensity = COALESCE($4, intensity),
                notes = COALESCE($5, notes)
             WHERE id = $1
             RETURNING {SYMPTOM_COLUMNS}"
        );
        sqlx::query_as::<_, Symptom>(&sql)
            .bind(id)
            .bind(update.logged_at)
            .bind(update.symptom_type)
            .bind(update.intensity)
            .bind(update.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM symptom_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
