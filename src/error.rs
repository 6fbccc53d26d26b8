use std::path::PathBuf;
use thiserror::Error;

/// Everything a request handler can surface to the caller.
///
/// File-level problems abort an enrichment run before any row is processed;
/// per-row problems are collected into the run outcome instead and never
/// appear here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("workbook has no sheets")]
    EmptyWorkbook,

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
