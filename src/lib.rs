pub mod analyzers;
pub mod config;
pub mod currency;
pub mod error;
pub mod ingest;
pub mod output;
