//! Streaming per-year salary statistics.

use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::types::YearStats;
use crate::analyzers::utility::{Bucket, SENTINEL_YEAR, round_salary};
use crate::ingest::Vacancy;

/// First year tracked by [`YearAggregator`].
pub const FIRST_YEAR: i32 = 2007;
/// Last year tracked by [`YearAggregator`], inclusive.
pub const LAST_YEAR: i32 = 2022;

const YEAR_SLOTS: usize = (LAST_YEAR - FIRST_YEAR + 1) as usize;

/// Running per-year means and counts for all vacancies and for those whose
/// name contains `title`.
///
/// Years outside [`FIRST_YEAR`]..=[`LAST_YEAR`] are dropped without error.
#[derive(Debug, Clone)]
pub struct YearAggregator {
    title: String,
    all: [Bucket; YEAR_SLOTS],
    matching: [Bucket; YEAR_SLOTS],
    out_of_range: usize,
}

impl YearAggregator {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            all: [Bucket::default(); YEAR_SLOTS],
            matching: [Bucket::default(); YEAR_SLOTS],
            out_of_range: 0,
        }
    }

    fn slot(year: i32) -> Option<usize> {
        (FIRST_YEAR..=LAST_YEAR)
            .contains(&year)
            .then(|| (year - FIRST_YEAR) as usize)
    }

    /// Case-sensitive substring test against the filter title.
    pub fn matches(&self, name: &str) -> bool {
        name.contains(self.title.as_str())
    }

    /// Folds one vacancy into the running statistics.
    pub fn observe(&mut self, vacancy: &Vacancy) {
        let Some(slot) = Self::slot(vacancy.year) else {
            self.out_of_range += 1;
            return;
        };

        self.all[slot].push(vacancy.salary);
        if self.matches(&vacancy.name) {
            self.matching[slot].push(vacancy.salary);
        }
    }

    /// Current bucket for `year` in the "all vacancies" series.
    pub fn bucket(&self, year: i32) -> Option<&Bucket> {
        Self::slot(year).map(|slot| &self.all[slot])
    }

    /// Current bucket for `year` in the title-filtered series.
    pub fn title_bucket(&self, year: i32) -> Option<&Bucket> {
        Self::slot(year).map(|slot| &self.matching[slot])
    }

    /// Rounds means, drops empty years, and applies the sentinel fallback.
    pub fn finish(self) -> YearStats {
        if self.out_of_range > 0 {
            debug!(
                out_of_range = self.out_of_range,
                "Ignored vacancies outside the tracked years"
            );
        }

        let (salary, count) = series(&self.all);
        let (title_salary, title_count) = series(&self.matching);

        YearStats {
            salary,
            count,
            title_salary,
            title_count,
        }
    }
}

fn series(buckets: &[Bucket; YEAR_SLOTS]) -> (BTreeMap<i32, i64>, BTreeMap<i32, usize>) {
    let mut salary = BTreeMap::new();
    let mut count = BTreeMap::new();

    for (year, bucket) in (FIRST_YEAR..).zip(buckets.iter()) {
        if bucket.is_empty() {
            continue;
        }
        salary.insert(year, round_salary(bucket.mean()));
        count.insert(year, bucket.count());
    }

    if salary.is_empty() {
        salary.insert(SENTINEL_YEAR, 0);
        count.insert(SENTINEL_YEAR, 0);
    }

    (salary, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vacancy(name: &str, year: i32, salary: f64) -> Vacancy {
        Vacancy {
            name: name.to_string(),
            salary,
            area_name: "Москва".to_string(),
            year,
            published_at: format!("{year}-01-01T00:00:00+0300"),
        }
    }

    #[test]
    fn test_means_and_counts_per_year() {
        let mut agg = YearAggregator::new("Инженер");
        for (year, salary) in [
            (2020, 100.0),
            (2020, 200.0),
            (2021, 300.0),
            (2021, 400.0),
            (2021, 500.0),
        ] {
            agg.observe(&vacancy("Программист", year, salary));
        }

        let stats = agg.finish();
        assert_eq!(stats.salary, BTreeMap::from([(2020, 150), (2021, 400)]));
        assert_eq!(stats.count, BTreeMap::from([(2020, 2), (2021, 3)]));
    }

    #[test]
    fn test_title_is_substring_match() {
        let mut agg = YearAggregator::new("Инженер");
        assert!(agg.matches("Старший Инженер"));
        assert!(!agg.matches("Аналитик"));
        assert!(!agg.matches("инженер"));

        agg.observe(&vacancy("Старший Инженер", 2019, 90_000.0));
        agg.observe(&vacancy("Аналитик", 2019, 70_000.0));

        assert_eq!(agg.title_bucket(2019).map(Bucket::count), Some(1));
        assert_eq!(agg.bucket(2019).map(Bucket::count), Some(2));

        let stats = agg.finish();
        assert_eq!(stats.title_salary, BTreeMap::from([(2019, 90_000)]));
        assert_eq!(stats.title_count, BTreeMap::from([(2019, 1)]));
        assert_eq!(stats.salary, BTreeMap::from([(2019, 80_000)]));
    }

    #[test]
    fn test_years_outside_domain_are_ignored() {
        let mut agg = YearAggregator::new("Dev");
        agg.observe(&vacancy("Dev", 2006, 10.0));
        agg.observe(&vacancy("Dev", 2023, 10.0));
        agg.observe(&vacancy("Dev", 2007, 30.0));

        assert!(agg.bucket(2006).is_none());
        let stats = agg.finish();
        assert_eq!(stats.count, BTreeMap::from([(2007, 1)]));
        assert_eq!(stats.salary, BTreeMap::from([(2007, 30)]));
    }

    #[test]
    fn test_empty_input_yields_sentinel() {
        let stats = YearAggregator::new("Dev").finish();
        let sentinel = BTreeMap::from([(2022, 0)]);
        assert_eq!(stats.salary, sentinel);
        assert_eq!(stats.title_salary, sentinel);
        assert_eq!(stats.count, BTreeMap::from([(2022, 0)]));
        assert_eq!(stats.title_count, BTreeMap::from([(2022, 0)]));
    }

    #[test]
    fn test_unmatched_title_yields_sentinel_only_for_filtered_series() {
        let mut agg = YearAggregator::new("Дизайнер");
        agg.observe(&vacancy("Программист", 2015, 50_000.0));

        let stats = agg.finish();
        assert_eq!(stats.salary, BTreeMap::from([(2015, 50_000)]));
        assert_eq!(stats.title_salary, BTreeMap::from([(2022, 0)]));
    }

    #[test]
    fn test_means_are_not_rounded_between_updates() {
        let mut agg = YearAggregator::new("");
        for salary in [0.4, 0.4, 0.4, 0.4] {
            agg.observe(&vacancy("Dev", 2010, salary));
        }
        agg.observe(&vacancy("Dev", 2010, 2.5));

        // (0.4 * 4 + 2.5) / 5 = 0.82
        let mean = agg.bucket(2010).map(Bucket::mean).unwrap();
        assert!((mean - 0.82).abs() < 1e-9);
        assert_eq!(agg.finish().salary, BTreeMap::from([(2010, 1)]));
    }
}
