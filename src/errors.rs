use thiserror::Error;

/// Error type for engine configuration and dataset loading failures.
///
/// The first three variants are configuration errors in the sense of the
/// engine contract: they indicate a caller/page misconfiguration and are
/// surfaced at call time rather than skipped per record.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("field '{field}' is not declared in the record schema")]
    FieldNotFound { field: String },
    #[error("page size must be a positive integer, got {page_size}")]
    InvalidPageSize { page_size: usize },
    #[error("benchmark for '{metric}' requires at least one competitor value")]
    EmptyBaselineSet { metric: String },
    #[error("duplicate record identity '{identity}' in collection")]
    DuplicateIdentity { identity: String },
    #[error("column '{column}' on data row {row}: {message}")]
    MalformedValue {
        column: String,
        row: usize,
        message: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
