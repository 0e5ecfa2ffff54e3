//! Merges 10-day municipal weather forecast archives (one JSON file per
//! province) and exports every forecast snapshot as an Excel workbook with one
//! sheet per forecast day.

pub mod config;
pub mod errors;
pub mod models;
pub mod run;
pub mod services;

pub use config::AppConfig;
pub use errors::{AppError, AppResult};
pub use run::{run, RunSummary};
