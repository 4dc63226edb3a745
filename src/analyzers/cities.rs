//! Per-city salary and vacancy-share statistics.
//!
//! Runs in two passes over the accepted vacancies. [`CityCounts::scan`] counts
//! occurrences per city so eligibility is known up front, then
//! [`CityAggregator`] accumulates running means only for eligible cities.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::analyzers::types::{CityStats, CityValue};
use crate::analyzers::utility::{Bucket, SENTINEL_YEAR, round_salary, round_to};
use crate::ingest::Vacancy;

/// Maximum number of cities kept in each ranking.
pub const TOP_CITIES: usize = 10;

/// Decimal places kept for vacancy shares.
const SHARE_PLACES: i32 = 4;

/// Pass-one occurrence counts.
#[derive(Debug, Clone, Default)]
pub struct CityCounts {
    total: usize,
    /// Cities in first-seen order, used to break ranking ties.
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl CityCounts {
    pub fn scan<'a>(vacancies: impl IntoIterator<Item = &'a Vacancy>) -> Self {
        let mut counts = Self::default();
        for vacancy in vacancies {
            counts.total += 1;
            match counts.counts.get_mut(&vacancy.area_name) {
                Some(n) => *n += 1,
                None => {
                    counts.order.push(vacancy.area_name.clone());
                    counts.counts.insert(vacancy.area_name.clone(), 1);
                }
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, city: &str) -> usize {
        self.counts.get(city).copied().unwrap_or(0)
    }

    /// One percent of all records, rounded down.
    pub fn min_count(&self) -> usize {
        self.total / 100
    }

    pub fn is_eligible(&self, city: &str) -> bool {
        self.counts
            .get(city)
            .is_some_and(|&n| n >= self.min_count())
    }
}

/// Pass-two accumulator over eligible cities.
#[derive(Debug, Clone)]
pub struct CityAggregator {
    counts: CityCounts,
    buckets: HashMap<String, Bucket>,
}

impl CityAggregator {
    pub fn new(counts: CityCounts) -> Self {
        let buckets = counts
            .order
            .iter()
            .filter(|city| counts.is_eligible(city))
            .map(|city| (city.clone(), Bucket::default()))
            .collect();
        Self { counts, buckets }
    }

    /// Folds one vacancy in. Vacancies from ineligible cities are ignored.
    pub fn observe(&mut self, vacancy: &Vacancy) {
        if let Some(bucket) = self.buckets.get_mut(&vacancy.area_name) {
            bucket.push(vacancy.salary);
        }
    }

    pub fn bucket(&self, city: &str) -> Option<&Bucket> {
        self.buckets.get(city)
    }

    /// Ranks eligible cities by mean salary and by share, keeping the top
    /// [`TOP_CITIES`] of each. Ties keep first-seen order.
    pub fn finish(self) -> CityStats {
        let total = self.counts.total;
        let eligible: Vec<(&String, &Bucket)> = self
            .counts
            .order
            .iter()
            .filter_map(|city| self.buckets.get(city).map(|b| (city, b)))
            .filter(|(_, b)| !b.is_empty())
            .collect();

        debug!(
            total,
            cities = self.counts.order.len(),
            eligible = eligible.len(),
            min_count = self.counts.min_count(),
            "Ranking cities"
        );

        let mut by_salary: Vec<(&String, f64)> =
            eligible.iter().map(|(city, b)| (*city, b.mean())).collect();
        by_salary.sort_by(|a, b| descending(a.1, b.1));

        let mut by_share: Vec<(&String, f64)> = eligible
            .iter()
            .map(|(city, b)| (*city, round_to(b.count() as f64 / total as f64, SHARE_PLACES)))
            .collect();
        by_share.sort_by(|a, b| descending(a.1, b.1));

        let mut salary: Vec<CityValue<i64>> = by_salary
            .into_iter()
            .take(TOP_CITIES)
            .map(|(city, mean)| CityValue {
                city: city.clone(),
                value: round_salary(mean),
            })
            .collect();
        let mut share: Vec<CityValue<f64>> = by_share
            .into_iter()
            .take(TOP_CITIES)
            .map(|(city, share)| CityValue {
                city: city.clone(),
                value: share,
            })
            .collect();

        if salary.is_empty() {
            salary.push(CityValue {
                city: SENTINEL_YEAR.to_string(),
                value: 0,
            });
        }
        if share.is_empty() {
            share.push(CityValue {
                city: SENTINEL_YEAR.to_string(),
                value: 0.0,
            });
        }

        CityStats { salary, share }
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Runs both passes over `vacancies`.
pub fn aggregate_cities(vacancies: &[Vacancy]) -> CityStats {
    let counts = CityCounts::scan(vacancies);
    let mut aggregator = CityAggregator::new(counts);
    for vacancy in vacancies {
        aggregator.observe(vacancy);
    }
    aggregator.finish()
}
