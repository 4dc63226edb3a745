//! Run configuration shared by the CLI subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::currency::{FixedRates, MonthlyRates, RateSource};

/// How strictly dataset rows are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strictness {
    /// Drop a row if any required field is empty.
    #[default]
    Strict,
    /// Keep a row as long as one salary bound is present.
    Lenient,
}

/// Where exchange rates come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RateConfig {
    /// The built-in scalar table.
    #[default]
    Embedded,
    /// A month-indexed CSV table.
    Monthly(PathBuf),
}

impl RateConfig {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(RateConfig::Monthly).unwrap_or_default()
    }

    /// Builds the configured rate source.
    pub fn build(&self) -> Result<Box<dyn RateSource>> {
        match self {
            RateConfig::Embedded => {
                info!("Using embedded currency rates");
                Ok(Box::new(FixedRates::embedded()))
            }
            RateConfig::Monthly(path) => {
                let rates = MonthlyRates::load(path)
                    .with_context(|| format!("failed to load rate table '{}'", path.display()))?;
                info!(
                    path = %path.display(),
                    months = rates.months(),
                    "Using monthly currency rates"
                );
                Ok(Box::new(rates))
            }
        }
    }
}

/// Everything an analysis run needs besides the dataset itself.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    /// Substring matched against vacancy names for the filtered series.
    pub title: String,
    pub strictness: Strictness,
    pub rates: RateConfig,
}

impl AnalysisConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_rates(mut self, rates: RateConfig) -> Self {
        self.rates = rates;
        self
    }
}
