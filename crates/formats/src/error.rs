use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("gzip payload could not be inflated: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("malformed json payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reorder index {index} out of range for {len} values")]
    ReorderOutOfRange { index: usize, len: usize },
    #[error("column {column:?} has {got} values, expected {expected}")]
    ColumnLength {
        column: String,
        got: usize,
        expected: usize,
    },
    #[error("missing required column {0:?}")]
    MissingColumn(String),
}
