use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, DateTime, Utc};

/// One logged menstrual cycle. `end` is absent while the cycle is ongoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CycleRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "start_date")]
    pub start: NaiveDate,
    #[sqlx(rename = "end_date")]
    pub end: Option<NaiveDate>,
    #[sqlx(rename = "length_days")]
    pub length: Option<i32>,
    pub ovulation_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CycleRecord {
    /// A cycle counts as completed once it has an end date and a non-zero length.
    pub fn is_completed(&self) -> bool {
        self.end.is_some() && matches!(self.length, Some(l) if l != 0)
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewCycle {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub length: Option<i32>,
    #[serde(default)]
    pub ovulation_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; only the fields that are present overwrite stored values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CycleUpdate {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub length: Option<i32>,
    pub ovulation_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CycleUpdate {
    pub fn apply(self, record: &mut CycleRecord) {
        if let Some(start) = self.start {
            record.start = start;
        }
        if let Some(end) = self.end {
            record.end = Some(end);
        }
        if let Some(length) = self.length {
            record.length = Some(length);
        }
        if let Some(ovulation_date) = self.ovulation_date {
            record.ovulation_date = Some(ovulation_date);
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FertilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub next_period_date: Option<NaiveDate>,
    pub next_ovulation_date: Option<NaiveDate>,
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    pub current_day: i64,
    pub fertility_level: FertilityLevel,
}

impl PredictionResult {
    /// `current_day` is only ever 0 for the "no history" result.
    pub fn is_sentinel(&self) -> bool {
        self.current_day == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Symptom {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub symptom_type: String,
    pub intensity: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewSymptom {
    pub logged_at: NaiveDate,
    pub symptom_type: String,
    #[serde(default)]
    pub intensity: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; only the fields that are present overwrite stored values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SymptomUpdate {
    pub logged_at: Option<NaiveDate>,
    pub symptom_type: Option<String>,
    pub intensity: Option<i32>,
    pub notes: Option<String>,
}

impl SymptomUpdate {
    pub fn apply(self, symptom: &mut Symptom) {
        if let Some(logged_at) = self.logged_at {
            symptom.logged_at = logged_at;
        }
        if let Some(symptom_type) = self.symptom_type {
            symptom.symptom_type = symptom_type;
        }
        if let Some(intensity) = self.intensity {
            symptom.intensity = Some(intensity);
        }
        if let Some(notes) = self.notes {
            symptom.notes = Some(notes);
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SymptomsByDate {
    pub logged_at: NaiveDate,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleRegularity {
    VeryRegular,
    Regular,
    Irregular,
    VeryIrregular,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomCount {
    pub symptom_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub cycles_considered: usize,
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    pub regularity: CycleRegularity,
    pub most_common_symptoms: Vec<SymptomCount>,
    pub average_symptom_intensity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityBands {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomStats {
    pub total_symptoms: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_intensity: IntensityBands,
    pub most_common: Option<String>,
}
