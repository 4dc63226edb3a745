//! Error types for ingestion and currency normalization.
//!
//! [`NormalizeError`] and [`SkipReason`] describe data-quality problems that
//! drop a single row. [`DatasetError`] is reserved for structural failures that
//! abort the run.

use std::io;

use thiserror::Error;

/// Why a salary could not be converted into the base currency.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("neither salary_from nor salary_to is present")]
    MissingSalary,
    #[error("no rate for currency '{0}'")]
    UnknownCurrency(String),
    #[error("no rates for period '{0}'")]
    UnknownPeriod(String),
}

/// Why a dataset row was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("row has {found} fields, header has {expected}")]
    FieldCount { expected: usize, found: usize },
    #[error("required field '{0}' is empty")]
    MissingField(&'static str),
    #[error("field '{field}' is not a number: '{value}'")]
    UnparseableNumber { field: &'static str, value: String },
    #[error("published_at '{0}' does not start with YYYY-MM")]
    MalformedDate(String),
    #[error("neither salary_from nor salary_to is present")]
    MissingSalary,
    #[error("no rate for currency '{0}'")]
    UnknownCurrency(String),
    #[error("no rates for period '{0}'")]
    UnknownPeriod(String),
    #[error("row could not be decoded: {0}")]
    UnreadableRow(String),
}

impl SkipReason {
    /// Stable key used when tallying skipped rows.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::FieldCount { .. } => "field_count",
            SkipReason::MissingField(_) => "missing_field",
            SkipReason::UnparseableNumber { .. } => "unparseable_number",
            SkipReason::MalformedDate(_) => "malformed_date",
            SkipReason::MissingSalary => "missing_salary",
            SkipReason::UnknownCurrency(_) => "unknown_currency",
            SkipReason::UnknownPeriod(_) => "unknown_period",
            SkipReason::UnreadableRow(_) => "unreadable_row",
        }
    }
}

impl From<NormalizeError> for SkipReason {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::MissingSalary => SkipReason::MissingSalary,
            NormalizeError::UnknownCurrency(code) => SkipReason::UnknownCurrency(code),
            NormalizeError::UnknownPeriod(period) => SkipReason::UnknownPeriod(period),
        }
    }
}

/// Structural failure reading a dataset or a rate table.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("header is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("malformed rate table: {0}")]
    RateTable(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_error_maps_to_skip_reason() {
        let reason: SkipReason = NormalizeError::UnknownCurrency("XYZ".into()).into();
        assert_eq!(reason, SkipReason::UnknownCurrency("XYZ".into()));
        assert_eq!(reason.kind(), "unknown_currency");

        let reason: SkipReason = NormalizeError::UnknownPeriod("2003-01".into()).into();
        assert_eq!(reason.kind(), "unknown_period");
    }

    #[test]
    fn test_skip_reason_messages() {
        let reason = SkipReason::FieldCount {
            expected: 6,
            found: 4,
        };
        assert_eq!(reason.to_string(), "row has 4 fields, header has 6");
        assert_eq!(
            SkipReason::MissingField("area_name").to_string(),
            "required field 'area_name' is empty"
        );
    }
}
