//! Longer-term statistics shown on the insights screen. Unlike [`crate::prediction`],
//! these look at every present `length` and at actual flow duration.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{
    CycleRecord, CycleRegularity, InsightsSummary, Symptom, SymptomCount, SymptomStats,
};
use crate::prediction::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};

const TOP_SYMPTOMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InsightsWindow {
    #[default]
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m", alias = "1y")]
    TwelveMonths,
}

impl InsightsWindow {
    pub fn months(self) -> u32 {
        match self {
            InsightsWindow::ThreeMonths => 3,
            InsightsWindow::SixMonths => 6,
            InsightsWindow::TwelveMonths => 12,
        }
    }

    pub fn cutoff(self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    Some((values.iter().sum::<i64>() as f64 / values.len() as f64).round() as i64)
}

pub fn average_cycle_length(records: &[CycleRecord]) -> i64 {
    let lengths: Vec<i64> = records.iter().filter_map(|c| c.length.map(i64::from)).collect();
    rounded_mean(&lengths).unwrap_or(DEFAULT_CYCLE_LENGTH)
}

/// Mean flow duration in days over cycles with an end date, each counted as at least 1.
pub fn average_period_length(records: &[CycleRecord]) -> i64 {
    let durations: Vec<i64> = records
        .iter()
        .filter_map(|c| c.end.map(|end| (end - c.start).num_days().max(1)))
        .collect();
    rounded_mean(&durations).unwrap_or(DEFAULT_PERIOD_LENGTH)
}

/// Classify by coefficient of variation of the recorded cycle lengths.
pub fn cycle_regularity(records: &[CycleRecord]) -> CycleRegularity {
    let lengths: Vec<f64> = records
        .iter()
        .filter_map(|c| c.length.filter(|&l| l != 0).map(f64::from))
        .collect();
    if records.len() < 2 || lengths.len() < 2 {
        return CycleRegularity::InsufficientData;
    }

    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    if mean == 0.0 {
        return CycleRegularity::InsufficientData;
    }
    let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
    let coefficient = variance.sqrt() / mean * 100.0;

    match coefficient {
        c if c < 10.0 => CycleRegularity::VeryRegular,
        c if c < 20.0 => CycleRegularity::Regular,
        c if c < 30.0 => CycleRegularity::Irregular,
        _ => CycleRegularity::VeryIrregular,
    }
}

pub fn most_common_symptoms(symptoms: &[Symptom]) -> Vec<SymptomCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in symptoms {
        *counts.entry(s.symptom_type.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<SymptomCount> = counts
        .into_iter()
        .map(|(symptom_type, count)| SymptomCount {
            symptom_type: symptom_type.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symptom_type.cmp(&b.symptom_type)));
    ranked.truncate(TOP_SYMPTOMS);
    ranked
}

pub fn average_symptom_intensity(symptoms: &[Symptom]) -> i64 {
    let intensities: Vec<i64> = symptoms
        .iter()
        .map(|s| i64::from(s.intensity.unwrap_or(0)))
        .collect();
    rounded_mean(&intensities).unwrap_or(0)
}

/// Counts for symptoms logged between `start` and `end`, both inclusive. Intensities
/// up to 3 are low, up to 7 medium, anything above high; missing ones are not banded.
pub fn symptom_stats(symptoms: &[Symptom], start: NaiveDate, end: NaiveDate) -> SymptomStats {
    let mut stats = SymptomStats::default();

    for s in symptoms.iter().filter(|s| s.logged_at >= start && s.logged_at <= end) {
        stats.total_symptoms += 1;
        *stats.by_type.entry(s.symptom_type.clone()).or_default() += 1;

        match s.intensity {
            Some(i) if i <= 3 => stats.by_intensity.low += 1,
            Some(i) if i <= 7 => stats.by_intensity.medium += 1,
            Some(_) => stats.by_intensity.high += 1,
            None => {}
        }
    }

    // ties go to the alphabetically first type
    let mut best: Option<(&String, usize)> = None;
    for (kind, &count) in &stats.by_type {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((kind, count));
        }
    }
    stats.most_common = best.map(|(kind, _)| kind.clone());

    stats
}

pub fn filter_window(
    records: &[CycleRecord],
    symptoms: &[Symptom],
    window: InsightsWindow,
    today: NaiveDate,
) -> (Vec<CycleRecord>, Vec<Symptom>) {
    let cutoff = window.cutoff(today);
    let records = records.iter().filter(|c| c.start >= cutoff).cloned().collect();
    let symptoms = symptoms.iter().filter(|s| s.logged_at >= cutoff).cloned().collect();
    (records, symptoms)
}

pub fn summarize(
    records: &[CycleRecord],
    symptoms: &[Symptom],
    window: InsightsWindow,
    today: NaiveDate,
) -> InsightsSummary {
    let (records, symptoms) = filter_window(records, symptoms, window, today);

    InsightsSummary {
        cycles_considered: records.len(),
        average_cycle_length: average_cycle_length(&records),
        average_period_length: average_period_length(&records),
        regularity: cycle_regularity(&records),
        most_common_symptoms: most_common_symptoms(&symptoms),
        average_symptom_intensity: average_symptom_intensity(&symptoms),
    }
}
