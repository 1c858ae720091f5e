use std::fmt;

use crate::FormatError;

/// One cell of a fetched column: numeric when it parses, text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let t = raw.trim();
        match t.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(t.to_string()),
        }
    }

    /// Numeric view; text cells read as NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(_) => f64::NAN,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// A single column as served by the expression API: one header cell followed
/// by one value per cell in the dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub header: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn numeric(&self) -> Vec<f64> {
        self.cells.iter().map(Cell::as_f64).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.to_string()).collect()
    }

    pub fn reordered(&self, order: &[usize]) -> Result<Self, FormatError> {
        Ok(Self {
            header: self.header.clone(),
            cells: reorder_by_indexes(&self.cells, order)?,
        })
    }
}

/// Parses a decompressed column payload: `header,v0,v1,...`.
///
/// Surrounding whitespace is trimmed and the first cell is kept as the header.
/// An empty payload yields an empty column.
pub fn parse_column(text: &str) -> Column {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Column::default();
    }
    let mut parts = trimmed.split(',');
    let header = parts.next().unwrap_or_default().trim().to_string();
    Column {
        header,
        cells: parts.map(Cell::parse).collect(),
    }
}

/// `out[i] = values[order[i]]`.
pub fn reorder_by_indexes<T: Clone>(values: &[T], order: &[usize]) -> Result<Vec<T>, FormatError> {
    order
        .iter()
        .map(|&index| {
            values
                .get(index)
                .cloned()
                .ok_or(FormatError::ReorderOutOfRange {
                    index,
                    len: values.len(),
                })
        })
        .collect()
}
