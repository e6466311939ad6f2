use std::path::PathBuf;

use thiserror::Error;

/// The dataset could not be turned into a table. Fatal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("{path}: no header row")]
    MissingHeaders { path: PathBuf },
    #[error("{path}: no data rows")]
    Empty { path: PathBuf },
    #[error("{path}: row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        path: PathBuf,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("{path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A column the caller asked for cannot serve the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("column '{0}' not found")]
    Missing(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{0}' has no finite values")]
    NoValues(String),
}

/// A recipe's required columns are absent from its input table.
///
/// Recoverable: the shell shows it as a warning in place of one chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{recipe}: missing columns: {}", .columns.join(", "))]
pub struct MissingColumnError {
    pub recipe: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Column(#[from] ColumnError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
