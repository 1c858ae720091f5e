//! URL query synchronisation.
//!
//! List selections travel as JSON arrays percent-encoded with the
//! `encodeURIComponent` alphabet, then the whole query string is
//! form-encoded on top. Parsing undoes both layers and also accepts values
//! that were only encoded once.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

pub const CELLTYPE_PARAM: &str = "celltype";
pub const GENE_PARAM: &str = "gene";
pub const MODE_PARAM: &str = "mode";
pub const PREFIX_PARAM: &str = "prefix";

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query value for {key:?} is not utf-8 after decoding")]
    Utf8 { key: String },
    #[error("query value for {key:?} is not a json string list: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("query value for {key:?} is not a number: {value:?}")]
    Number { key: String, value: String },
}

/// Ordered query parameters with `URLSearchParams` semantics: `set` replaces
/// the first occurrence in place and drops later duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Stores a non-empty list as percent-encoded JSON; an empty list removes
    /// the key.
    pub fn set_list(&mut self, key: &str, values: &[String]) {
        if values.is_empty() {
            self.remove(key);
            return;
        }
        // Serializing a slice of strings cannot fail.
        let json = serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string());
        self.set(key, utf8_percent_encode(&json, COMPONENT).to_string());
    }

    pub fn list(&self, key: &str) -> Result<Option<Vec<String>>, QueryError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| QueryError::Utf8 {
                key: key.to_string(),
            })?;
        serde_json::from_str(&decoded)
            .map(Some)
            .map_err(|source| QueryError::Json {
                key: key.to_string(),
                source,
            })
    }

    pub fn number(&self, key: &str) -> Result<Option<f64>, QueryError> {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|_| QueryError::Number {
                    key: key.to_string(),
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}
