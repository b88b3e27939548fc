use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_dates, CycleStore, StoreError, SymptomStore, OPEN_CYCLE_CONFLICT};
use crate::models::{CycleRecord, CycleUpdate, NewCycle, NewSymptom, Symptom, SymptomUpdate};

/// In-process store, used by tests and for running without Postgres.
#[derive(Default)]
pub struct MemoryStore {
    cycles: RwLock<HashMap<Uuid, CycleRecord>>,
    symptoms: RwLock<HashMap<Uuid, Symptom>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_open(cycles: &HashMap<Uuid, CycleRecord>, user_id: Uuid) -> Option<&CycleRecord> {
    cycles
        .values()
        .filter(|c| c.user_id == user_id && c.is_open())
        .max_by_key(|c| c.start)
}

#[async_trait]
impl CycleStore for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<CycleRecord>, StoreError> {
        let cycles = self.cycles.read().await;
        let mut out: Vec<CycleRecord> = cycles
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.start.cmp(&a.start));
        Ok(out)
    }

    async fn append(&self, user_id: Uuid, cycle: NewCycle) -> Result<CycleRecord, StoreError> {
        let mut cycles = self.cycles.write().await;
        if cycle.end.is_none() && newest_open(&cycles, user_id).is_some() {
            return Err(StoreError::Conflict(OPEN_CYCLE_CONFLICT.into()));
        }

        let record = CycleRecord {
            id: Uuid::new_v4(),
            user_id,
            start: cycle.start,
            end: cycle.end,
            length: cycle.length,
            ovulation_date: cycle.ovulation_date,
            notes: cycle.notes,
            created_at: Utc::now(),
        };
        cycles.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, update: CycleUpdate) -> Result<CycleRecord, StoreError> {
        let mut cycles = self.cycles.write().await;
        let record = cycles.get_mut(&id).ok_or(StoreError::NotFound)?;
        let mut merged = record.clone();
        update.apply(&mut merged);
        check_dates(&merged)?;
        *record = merged.clone();
        Ok(merged)
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        self.cycles
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn current(&self, user_id: Uuid) -> Result<Option<CycleRecord>, StoreError> {
        let cycles = self.cycles.read().await;
        Ok(newest_open(&cycles, user_id).cloned())
    }
}

#[async_trait]
impl SymptomStore for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Symptom>, StoreError> {
        let symptoms = self.symptoms.read().await;
        let mut out: Vec<Symptom> = symptoms
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        Ok(out)
    }

    async fn list_on(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<Symptom>, StoreError> {
        let symptoms = self.symptoms.read().await;
        Ok(symptoms
            .values()
            .filter(|s| s.user_id == user_id && s.logged_at == date)
            .cloned()
            .collect())
    }

    async fn append(&self, user_id: Uuid, symptom: NewSymptom) -> Result<Symptom, StoreError> {
        let record = Symptom {
            id: Uuid::new_v4(),
            user_id,
            logged_at: symptom.logged_at,
            symptom_type: symptom.symptom_type,
            intensity: symptom.intensity,
            notes: symptom.notes,
        };
        self.symptoms.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, update: SymptomUpdate) -> Result<Symptom, StoreError> {
        let mut symptoms = self.symptoms.write().await;
        let symptom = symptoms.get_mut(&id).ok_or(StoreError::NotFound)?;
        update.apply(symptom);
        Ok(symptom.clone())
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        self.symptoms
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_cycle(start: &str, end: Option<&str>) -> NewCycle {
        NewCycle {
            start: date(start),
            end: end.map(date),
            length: end.map(|_| 28),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cycles_are_listed_newest_first_per_user() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        CycleStore::append(&store, alice, new_cycle("2025-01-01", Some("2025-01-05"))).await.unwrap();
        CycleStore::append(&store, alice, new_cycle("2025-02-01", None)).await.unwrap();
        CycleStore::append(&store, bob, new_cycle("2025-03-01", None)).await.unwrap();

        let cycles = CycleStore::list(&store, alice).await.unwrap();
        let starts: Vec<NaiveDate> = cycles.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![date("2025-02-01"), date("2025-01-01")]);
    }

    #[tokio::test]
    async fn second_open_cycle_is_rejected() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        CycleStore::append(&store, user, new_cycle("2025-01-01", None)).await.unwrap();
        let err = CycleStore::append(&store, user, new_cycle("2025-02-01", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // closed cycles are always accepted
        CycleStore::append(&store, user, new_cycle("2024-12-01", Some("2024-12-05")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_closes_the_current_cycle() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let open = CycleStore::append(&store, user, new_cycle("2025-01-01", None)).await.unwrap();
        assert_eq!(store.current(user).await.unwrap(), Some(open.clone()));

        let closed = CycleStore::update(
            &store,
            open.id,
            CycleUpdate {
                end: Some(date("2025-01-05")),
                length: Some(29),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(closed.is_completed());
        assert_eq!(closed.start, open.start);
        assert_eq!(store.current(user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_keeps_stored_cycle_when_end_precedes_start() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let open = CycleStore::append(&store, user, new_cycle("2025-02-01", None)).await.unwrap();

        let err = CycleStore::update(
            &store,
            open.id,
            CycleUpdate {
                end: Some(date("2025-01-20")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(store.current(user).await.unwrap(), Some(open));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(CycleStore::remove(&store, id).await, Err(StoreError::NotFound)));
        assert!(matches!(SymptomStore::remove(&store, id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            CycleStore::update(&store, id, CycleUpdate::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            SymptomStore::update(&store, id, SymptomUpdate::default()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn symptoms_filter_by_day() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for (day, kind) in [("2025-01-02", "cramps"), ("2025-01-02", "fatigue"), ("2025-01-03", "acne")] {
            SymptomStore::append(
                &store,
                user,
                NewSymptom {
                    logged_at: date(day),
                    symptom_type: kind.into(),
                    intensity: Some(2),
                    notes: None,
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(store.list_on(user, date("2025-01-02")).await.unwrap().len(), 2);
        let all = SymptomStore::list(&store, user).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].logged_at, date("2025-01-03"));

        let edited = SymptomStore::update(
            &store,
            all[0].id,
            SymptomUpdate {
                intensity: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.intensity, Some(5));
        assert_eq!(edited.symptom_type, "acne");
    }
}
