//! Dataset ingestion: header resolution, row validation, and normalization.
//!
//! Rows that fail validation or currency conversion are skipped and tallied in
//! an [`IngestSummary`]. Only structural problems (unreadable source, missing
//! header columns) surface as [`DatasetError`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use flate2::read::GzDecoder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Strictness;
use crate::currency::Normalizer;
use crate::error::{DatasetError, SkipReason};

/// Header names every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "salary_from",
    "salary_to",
    "salary_currency",
    "area_name",
    "published_at",
];

/// A validated dataset row before currency conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyRecord {
    pub name: String,
    pub salary_from: Option<f64>,
    pub salary_to: Option<f64>,
    pub currency: String,
    pub area: String,
    pub published_at: String,
}

impl VacancyRecord {
    /// First four characters of `published_at`.
    pub fn year(&self) -> Option<i32> {
        let year = self.published_at.get(..4)?;
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        year.parse().ok()
    }

    /// First seven characters of `published_at` (`YYYY-MM`).
    pub fn month(&self) -> Option<&str> {
        self.published_at.get(..7)
    }
}

/// A vacancy whose salary has been converted to the base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vacancy {
    pub name: String,
    pub salary: f64,
    pub area_name: String,
    #[serde(skip)]
    pub year: i32,
    pub published_at: String,
}

/// Positions of the required fields within a row.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    name: usize,
    salary_from: usize,
    salary_to: usize,
    salary_currency: usize,
    area_name: usize,
    published_at: usize,
    width: usize,
}

impl Columns {
    /// Resolves field positions from the header row.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, DatasetError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}'))
            .collect();
        let find = |column: &'static str| {
            names
                .iter()
                .position(|h| *h == column)
                .ok_or(DatasetError::MissingColumn(column))
        };

        Ok(Self {
            name: find("name")?,
            salary_from: find("salary_from")?,
            salary_to: find("salary_to")?,
            salary_currency: find("salary_currency")?,
            area_name: find("area_name")?,
            published_at: find("published_at")?,
            width: names.len(),
        })
    }

    fn indexed(&self) -> [(&'static str, usize); 6] {
        [
            ("name", self.name),
            ("salary_from", self.salary_from),
            ("salary_to", self.salary_to),
            ("salary_currency", self.salary_currency),
            ("area_name", self.area_name),
            ("published_at", self.published_at),
        ]
    }
}

fn parse_bound(field: &'static str, value: &str) -> Result<Option<f64>, SkipReason> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| SkipReason::UnparseableNumber {
            field,
            value: value.to_string(),
        })
}

/// Validates a single row against the header layout.
pub fn parse_row(
    row: &StringRecord,
    columns: &Columns,
    strictness: Strictness,
) -> Result<VacancyRecord, SkipReason> {
    if row.len() != columns.width {
        return Err(SkipReason::FieldCount {
            expected: columns.width,
            found: row.len(),
        });
    }

    let field = |idx: usize| row.get(idx).unwrap_or_default();

    match strictness {
        Strictness::Strict => {
            if let Some((name, _)) = columns
                .indexed()
                .into_iter()
                .find(|(_, idx)| field(*idx).is_empty())
            {
                return Err(SkipReason::MissingField(name));
            }
        }
        Strictness::Lenient => {
            if field(columns.salary_currency).is_empty() {
                return Err(SkipReason::MissingField("salary_currency"));
            }
            if field(columns.published_at).is_empty() {
                return Err(SkipReason::MissingField("published_at"));
            }
        }
    }

    let salary_from = parse_bound("salary_from", field(columns.salary_from))?;
    let salary_to = parse_bound("salary_to", field(columns.salary_to))?;
    if salary_from.is_none() && salary_to.is_none() {
        return Err(SkipReason::MissingSalary);
    }

    let record = VacancyRecord {
        name: field(columns.name).to_string(),
        salary_from,
        salary_to,
        currency: field(columns.salary_currency).to_string(),
        area: field(columns.area_name).to_string(),
        published_at: field(columns.published_at).to_string(),
    };

    if record.year().is_none() || record.month().is_none() {
        return Err(SkipReason::MalformedDate(record.published_at));
    }

    Ok(record)
}

/// Converts a validated record into a [`Vacancy`].
pub fn normalize_record(
    record: VacancyRecord,
    normalizer: &Normalizer<'_>,
) -> Result<Vacancy, SkipReason> {
    let year = record
        .year()
        .ok_or_else(|| SkipReason::MalformedDate(record.published_at.clone()))?;
    let salary = normalizer.normalize(
        record.salary_from,
        record.salary_to,
        &record.currency,
        record.month(),
    )?;

    Ok(Vacancy {
        name: record.name,
        salary,
        area_name: record.area,
        year,
        published_at: record.published_at,
    })
}

/// Row accounting for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    pub skipped: BTreeMap<&'static str, usize>,
}

impl IngestSummary {
    pub fn rows_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: &SkipReason) {
        *self.skipped.entry(reason.kind()).or_default() += 1;
    }
}

/// Accepted vacancies plus the row accounting that produced them.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub vacancies: Vec<Vacancy>,
    pub summary: IngestSummary,
}

/// Opens a dataset file, gzip-decoding it when the name ends in `.gz`.
pub fn open_dataset(path: impl AsRef<Path>) -> Result<Box<dyn Read>, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path)?;

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        debug!(path = %path.display(), "Reading gzip-compressed dataset");
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads every row of a dataset, keeping the ones that validate and normalize.
pub fn load_vacancies<R: Read>(
    reader: R,
    strictness: Strictness,
    normalizer: &Normalizer<'_>,
) -> Result<Ingested, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut ingested = Ingested::default();

    if headers.is_empty() {
        warn!("Dataset is empty");
        return Ok(ingested);
    }
    let columns = Columns::from_headers(&headers)?;

    for (idx, result) in rdr.records().enumerate() {
        // records() starts after the header; lines are 1-based
        let line = idx + 2;
        ingested.summary.rows_read += 1;

        let outcome = match result {
            Ok(row) => parse_row(&row, &columns, strictness)
                .and_then(|record| normalize_record(record, normalizer)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => Err(SkipReason::UnreadableRow(e.to_string())),
        };

        match outcome {
            Ok(vacancy) => {
                ingested.summary.rows_used += 1;
                ingested.vacancies.push(vacancy);
            }
            Err(reason) => {
                debug!(line, reason = %reason, "Skipping row");
                ingested.summary.skip(&reason);
            }
        }
    }

    info!(
        rows_read = ingested.summary.rows_read,
        rows_used = ingested.summary.rows_used,
        rows_skipped = ingested.summary.rows_skipped(),
        "Dataset ingested"
    );

    Ok(ingested)
}
