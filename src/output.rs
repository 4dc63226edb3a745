//! Output formatting and persistence for analysis results.
//!
//! Supports logging the series, pretty JSON reports, and CSV export of
//! normalized vacancies (optionally gzip-compressed).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::analyzers::types::SalaryReport;
use crate::ingest::Vacancy;

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &SalaryReport) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &SalaryReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Logs each of the six series on its own line.
pub fn log_series(report: &SalaryReport) -> Result<()> {
    let years = &report.years;
    let cities = &report.cities;

    info!(series = %serde_json::to_string(&years.salary)?, "Salary by year");
    info!(series = %serde_json::to_string(&years.count)?, "Vacancies by year");
    info!(
        title = %report.title,
        series = %serde_json::to_string(&years.title_salary)?,
        "Salary by year for title"
    );
    info!(
        title = %report.title,
        series = %serde_json::to_string(&years.title_count)?,
        "Vacancies by year for title"
    );
    info!(series = %serde_json::to_string(&cities.salary)?, "Salary by city, descending");
    info!(series = %serde_json::to_string(&cities.share)?, "Vacancy share by city, descending");
    Ok(())
}

/// Writes the report to `path` as pretty-printed JSON.
pub fn write_report(path: &Path, report: &SalaryReport) -> Result<()> {
    debug!(path = %path.display(), "Writing JSON report");
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

fn write_csv<W: Write>(writer: W, vacancies: &[Vacancy]) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for vacancy in vacancies {
        writer.serialize(vacancy)?;
    }
    writer.flush()?;

    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Writes normalized vacancies as `name,salary,area_name,published_at` rows.
///
/// When `gzip` is set the file is compressed and `.gz` is appended to `path`.
pub fn write_vacancies(path: &Path, vacancies: &[Vacancy], gzip: bool) -> Result<PathBuf> {
    let path = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };
    debug!(path = %path.display(), rows = vacancies.len(), gzip, "Writing normalized vacancies");

    let file = File::create(&path)?;
    if gzip {
        let encoder = write_csv(GzEncoder::new(file, Compression::default()), vacancies)?;
        encoder.finish()?;
    } else {
        write_csv(file, vacancies)?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io::Read;

    use chrono::Utc;
    use flate2::read::GzDecoder;

    use super::*;
    use crate::analyzers::analyzer::summarize;
    use crate::ingest::IngestSummary;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn vacancies() -> Vec<Vacancy> {
        vec![
            Vacancy {
                name: "Инженер".to_string(),
                salary: 1500.5,
                area_name: "Москва".to_string(),
                year: 2020,
                published_at: "2020-01-01T00:00:00+0300".to_string(),
            },
            Vacancy {
                name: "Аналитик".to_string(),
                salary: 900.0,
                area_name: "Пермь".to_string(),
                year: 2021,
                published_at: "2021-01-01T00:00:00+0300".to_string(),
            },
        ]
    }

    fn report() -> SalaryReport {
        let (years, cities) = summarize(&vacancies(), "Инженер");
        SalaryReport {
            schema_version: 1,
            generated_at: Utc::now(),
            title: "Инженер".to_string(),
            base_currency: "RUR".to_string(),
            years,
            cities,
            ingest: IngestSummary::default(),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report()).unwrap();
        log_series(&report()).unwrap();
    }

    #[test]
    fn test_write_report_round_trips_as_json() {
        let path = temp_path("vacancy_stats_test_report.json");
        let _ = fs::remove_file(&path);

        write_report(&path, &report()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["title"], "Инженер");
        assert_eq!(value["years"]["count"]["2020"], 1);
        assert_eq!(value["cities"]["salary"][0]["city"], "Москва");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_vacancies_csv() {
        let path = temp_path("vacancy_stats_test_convert.csv");
        let _ = fs::remove_file(&path);

        let written = write_vacancies(&path, &vacancies(), false).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "name,salary,area_name,published_at");
        assert_eq!(lines[1], "Инженер,1500.5,Москва,2020-01-01T00:00:00+0300");
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_vacancies_gzip() {
        let path = temp_path("vacancy_stats_test_convert_gz.csv");
        let written = write_vacancies(&path, &vacancies(), true).unwrap();
        assert_eq!(
            written.file_name().and_then(|n| n.to_str()),
            Some("vacancy_stats_test_convert_gz.csv.gz")
        );

        let mut content = String::new();
        GzDecoder::new(File::open(&written).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("name,salary,area_name,published_at"));
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&written).unwrap();
    }
}
