/// Key substituted into a series that would otherwise be empty.
pub const SENTINEL_YEAR: i32 = 2022;

/// Running mean and count for one year or city.
///
/// Values are folded in with `mean' = (mean * n + x) / (n + 1)`, so the raw
/// salaries never need to be kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    mean: f64,
    count: usize,
}

impl Bucket {
    pub fn push(&mut self, value: f64) {
        let n = self.count as f64;
        self.mean = (self.mean * n + value) / (n + 1.0);
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Rounds a salary to the nearest whole unit for output.
pub fn round_salary(value: f64) -> i64 {
    value.round() as i64
}

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
