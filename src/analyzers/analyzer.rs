use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::analyzers::cities::aggregate_cities;
use crate::analyzers::types::{CityStats, SalaryReport, YearStats};
use crate::analyzers::years::YearAggregator;
use crate::config::AnalysisConfig;
use crate::currency::Normalizer;
use crate::ingest::{Ingested, Vacancy, load_vacancies, open_dataset};

const SCHEMA_VERSION: u8 = 1;

/// Computes the year and city statistics for already-normalized vacancies.
pub fn summarize(vacancies: &[Vacancy], title: &str) -> (YearStats, CityStats) {
    let mut years = YearAggregator::new(title);
    for vacancy in vacancies {
        years.observe(vacancy);
    }

    (years.finish(), aggregate_cities(vacancies))
}

/// Reads, validates, and normalizes every row of a dataset.
pub fn ingest_reader<R: Read>(reader: R, config: &AnalysisConfig) -> Result<Ingested> {
    ingest(reader, config).map(|(ingested, _)| ingested)
}

/// Ingests with the configured rate source, returning its base currency too.
fn ingest<R: Read>(reader: R, config: &AnalysisConfig) -> Result<(Ingested, String)> {
    let rates = config.rates.build()?;
    let normalizer = Normalizer::new(&*rates);
    let ingested = load_vacancies(reader, config.strictness, &normalizer)
        .context("failed to read vacancy dataset")?;
    Ok((ingested, normalizer.base().to_string()))
}

/// Opens the dataset at `path` and ingests it.
#[tracing::instrument(skip_all, fields(path = %path.display(), strictness = ?config.strictness))]
pub fn ingest_file(path: &Path, config: &AnalysisConfig) -> Result<Ingested> {
    let reader = open_dataset(path)
        .with_context(|| format!("failed to open dataset '{}'", path.display()))?;
    ingest_reader(reader, config)
}

/// Runs the whole pipeline over any CSV source.
pub fn analyze_reader<R: Read>(reader: R, config: &AnalysisConfig) -> Result<SalaryReport> {
    let (ingested, base_currency) = ingest(reader, config)?;

    let (years, cities) = summarize(&ingested.vacancies, &config.title);

    info!(
        vacancies = ingested.vacancies.len(),
        title = %config.title,
        "Analysis complete"
    );

    Ok(SalaryReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        title: config.title.clone(),
        base_currency,
        years,
        cities,
        ingest: ingested.summary,
    })
}

/// Runs the whole pipeline over the dataset at `path`.
#[tracing::instrument(skip_all, fields(path = %path.display(), title = %config.title))]
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<SalaryReport> {
    let reader = open_dataset(path)
        .with_context(|| format!("failed to open dataset '{}'", path.display()))?;
    analyze_reader(reader, config)
}
