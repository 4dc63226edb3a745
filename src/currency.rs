//! Salary normalization into the base currency.
//!
//! [`RateSource`] is the read-only seam for exchange rates. [`FixedRates`] is a
//! scalar `code -> rate` table, [`MonthlyRates`] a `(YYYY-MM, code) -> rate`
//! table loaded from CSV. [`Normalizer`] turns a salary range into a single
//! amount using whichever source it was given.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{DatasetError, NormalizeError};

/// Currency every salary is converted into.
pub const BASE_CURRENCY: &str = "RUR";

/// Rates to [`BASE_CURRENCY`] used when no historical table is supplied.
static EMBEDDED_RATES: &[(&str, f64)] = &[
    ("AZN", 35.68),
    ("BYR", 23.91),
    ("EUR", 59.90),
    ("GEL", 21.74),
    ("KGS", 0.76),
    ("KZT", 0.13),
    ("RUR", 1.0),
    ("UAH", 1.64),
    ("USD", 60.66),
    ("UZS", 0.0055),
];

/// Resolves the multiplier that converts an amount in `currency` into the base
/// currency.
pub trait RateSource {
    /// Code of the currency this source converts into.
    fn base(&self) -> &str;

    /// Looks up the rate for `currency`, optionally within a `YYYY-MM` period.
    fn rate(&self, currency: &str, period: Option<&str>) -> Result<f64, NormalizeError>;
}

/// Scalar rate table that ignores the period.
#[derive(Debug, Clone)]
pub struct FixedRates {
    base: String,
    rates: HashMap<String, f64>,
}

impl FixedRates {
    pub fn new(base: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.into(),
            rates,
        }
    }

    /// The built-in table with `RUR` as the base currency.
    pub fn embedded() -> Self {
        let rates = EMBEDDED_RATES
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        Self::new(BASE_CURRENCY, rates)
    }
}

impl RateSource for FixedRates {
    fn base(&self) -> &str {
        &self.base
    }

    fn rate(&self, currency: &str, _period: Option<&str>) -> Result<f64, NormalizeError> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| NormalizeError::UnknownCurrency(currency.to_string()))
    }
}

/// Historical rate table keyed by month.
///
/// Read from a CSV whose `date` column holds `YYYY-MM` and whose remaining
/// columns are currency codes:
///
/// ```text
/// date,BYR,EUR,KZT,UAH,USD
/// 2007-01,0.012,34.68,0.21,5.24,26.58
/// ```
///
/// Empty cells mean the currency had no rate that month.
#[derive(Debug, Clone, Default)]
pub struct MonthlyRates {
    base: String,
    months: HashMap<String, HashMap<String, f64>>,
}

impl MonthlyRates {
    /// Loads the table from a CSV file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parses the table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == "date")
            .ok_or(DatasetError::MissingColumn("date"))?;

        let mut months = HashMap::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;
            let raw = record.get(date_idx).unwrap_or_default();
            let period = raw.get(..7).ok_or_else(|| {
                DatasetError::RateTable(format!("line {line}: '{raw}' is not YYYY-MM"))
            })?;

            let rates: HashMap<String, f64> = headers
                .iter()
                .zip(record.iter())
                .enumerate()
                .filter(|(i, _)| *i != date_idx)
                .filter_map(|(_, (code, cell))| {
                    cell.parse::<f64>()
                        .ok()
                        .filter(|rate| rate.is_finite())
                        .map(|rate| (code.to_string(), rate))
                })
                .collect();

            months.insert(period.to_string(), rates);
        }

        debug!(months = months.len(), "Loaded monthly rate table");

        Ok(Self {
            base: BASE_CURRENCY.to_string(),
            months,
        })
    }

    pub fn months(&self) -> usize {
        self.months.len()
    }
}

impl RateSource for MonthlyRates {
    fn base(&self) -> &str {
        &self.base
    }

    fn rate(&self, currency: &str, period: Option<&str>) -> Result<f64, NormalizeError> {
        let period = period.unwrap_or_default();
        let month = self
            .months
            .get(period)
            .ok_or_else(|| NormalizeError::UnknownPeriod(period.to_string()))?;

        month
            .get(currency)
            .copied()
            .ok_or_else(|| NormalizeError::UnknownCurrency(currency.to_string()))
    }
}

/// Average of the salary bounds that are present.
pub fn midpoint(salary_from: Option<f64>, salary_to: Option<f64>) -> Result<f64, NormalizeError> {
    match (salary_from, salary_to) {
        (Some(from), Some(to)) => Ok((from + to) / 2.0),
        (Some(bound), None) | (None, Some(bound)) => Ok(bound),
        (None, None) => Err(NormalizeError::MissingSalary),
    }
}

/// Converts salary ranges into the base currency of its [`RateSource`].
pub struct Normalizer<'a> {
    source: &'a dyn RateSource,
}

impl<'a> Normalizer<'a> {
    pub fn new(source: &'a dyn RateSource) -> Self {
        Self { source }
    }

    pub fn base(&self) -> &str {
        self.source.base()
    }

    /// Returns `midpoint * rate` without rounding.
    pub fn normalize(
        &self,
        salary_from: Option<f64>,
        salary_to: Option<f64>,
        currency: &str,
        period: Option<&str>,
    ) -> Result<f64, NormalizeError> {
        let mid = midpoint(salary_from, salary_to)?;
        let rate = if currency == self.source.base() {
            1.0
        } else {
            self.source.rate(currency, period)?
        };
        Ok(mid * rate)
    }
}
