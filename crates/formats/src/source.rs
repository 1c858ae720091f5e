//! Expression data source abstraction.
//!
//! The viewer only needs two calls from the remote service: a gzip-compressed
//! column of per-cell values (`fetch_column`) and a short list of constant
//! values such as cluster names or palette colors (`fetch_values`).
//! Transports implement `ExpressionSource`; `StaticSource` serves fixtures
//! from memory.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::debug;

use crate::{Column, FormatError, parse_column};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("column {column:?} not found for prefix {prefix:?}")]
    NotFound { column: String, prefix: String },
    #[error("http status {status} while fetching {column:?}")]
    Http { status: u16, column: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Decode(#[from] FormatError),
}

/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait ExpressionSource: Send + Sync {
    /// Fetches one full column (a gene or a metadata field) for a dataset.
    fn fetch_column<'a>(
        &'a self,
        column: &'a str,
        prefix: &'a str,
    ) -> BoxFuture<'a, Result<Column, SourceError>>;

    /// Fetches the constant value list stored under `column`.
    fn fetch_values<'a>(
        &'a self,
        column: &'a str,
        prefix: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, SourceError>>;
}

/// In-memory source keyed by `(prefix, column)`.
#[derive(Debug, Default)]
pub struct StaticSource {
    columns: HashMap<(String, String), Column>,
    values: HashMap<(String, String), Vec<String>>,
    failing: HashMap<String, u16>,
    requests: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, prefix: &str, column: Column) -> Self {
        self.columns
            .insert((prefix.to_string(), column.header.clone()), column);
        self
    }

    /// Registers a column from its wire text, `header,v0,v1,...`.
    pub fn with_column_text(self, prefix: &str, text: &str) -> Self {
        self.with_column(prefix, parse_column(text))
    }

    pub fn with_values(mut self, prefix: &str, column: &str, values: Vec<String>) -> Self {
        self.values
            .insert((prefix.to_string(), column.to_string()), values);
        self
    }

    /// Makes every request for `column` fail with the given HTTP status.
    pub fn with_failure(mut self, column: &str, status: u16) -> Self {
        self.failing.insert(column.to_string(), status);
        self
    }

    /// Total number of fetches served so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn check_failure(&self, column: &str) -> Result<(), SourceError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match self.failing.get(column) {
            Some(&status) => Err(SourceError::Http {
                status,
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl ExpressionSource for StaticSource {
    fn fetch_column<'a>(
        &'a self,
        column: &'a str,
        prefix: &'a str,
    ) -> BoxFuture<'a, Result<Column, SourceError>> {
        Box::pin(async move {
            self.check_failure(column)?;
            debug!(column, prefix, "static column fetch");
            self.columns
                .get(&(prefix.to_string(), column.to_string()))
                .cloned()
                .ok_or_else(|| SourceError::NotFound {
                    column: column.to_string(),
                    prefix: prefix.to_string(),
                })
        })
    }

    fn fetch_values<'a>(
        &'a self,
        column: &'a str,
        prefix: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, SourceError>> {
        Box::pin(async move {
            self.check_failure(column)?;
            Ok(self
                .values
                .get(&(prefix.to_string(), column.to_string()))
                .cloned()
                .unwrap_or_default())
        })
    }
}
