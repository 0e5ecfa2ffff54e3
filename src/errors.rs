use std::path::PathBuf;

/// Every failure the converter can hit. A single error aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No JSON files provided in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Invalid forecast data in {}: {message}", file.display())]
    Validation { file: PathBuf, message: String },

    #[error("{0}")]
    Structural(String),

    #[error("Missing day data on {municipality}, {date_created}")]
    IncompleteData {
        municipality: String,
        date_created: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

pub type AppResult<T> = Result<T, AppError>;
