//! Salary aggregation.
//!
//! This module folds normalized vacancies into per-year running means and
//! counts, ranks eligible cities by mean salary and vacancy share, and
//! assembles the resulting [`types::SalaryReport`].

pub mod analyzer;
pub mod cities;
pub mod types;
pub mod utility;
pub mod years;
