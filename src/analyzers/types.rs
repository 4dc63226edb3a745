//! Data types produced by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ingest::IngestSummary;

/// One ranked entry of a per-city series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityValue<T> {
    pub city: String,
    pub value: T,
}

/// Per-year salary means and vacancy counts for all vacancies and for the
/// title-filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStats {
    pub salary: BTreeMap<i32, i64>,
    pub count: BTreeMap<i32, usize>,
    pub title_salary: BTreeMap<i32, i64>,
    pub title_count: BTreeMap<i32, usize>,
}

/// Top cities by mean salary and by share of vacancies, each in descending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityStats {
    pub salary: Vec<CityValue<i64>>,
    pub share: Vec<CityValue<f64>>,
}

/// Complete result of one analysis run, handed to report renderers.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub title: String,
    pub base_currency: String,
    pub years: YearStats,
    pub cities: CityStats,
    pub ingest: IngestSummary,
}
