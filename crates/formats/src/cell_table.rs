use crate::{Column, FormatError};

pub const SPATIAL_X_COLUMN: &str = "X_spatial0_norm";
pub const SPATIAL_Y_COLUMN: &str = "X_spatial1_norm";
pub const SPATIAL_Z_COLUMN: &str = "X_spatial2_norm";
pub const CLUSTER_COLUMN: &str = "clusters";

/// Per-cell metadata needed to lay out the point cloud.
///
/// Spatial columns hold normalized coordinates; non-numeric entries are NaN.
/// A dataset without a third spatial column reads as `z = 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTable {
    pub spatial0: Vec<f64>,
    pub spatial1: Vec<f64>,
    pub spatial2: Option<Vec<f64>>,
    pub clusters: Vec<String>,
}

impl CellTable {
    pub fn from_columns(
        spatial0: &Column,
        spatial1: &Column,
        spatial2: Option<&Column>,
        clusters: &Column,
    ) -> Result<Self, FormatError> {
        let expected = clusters.len();
        check_len(SPATIAL_X_COLUMN, spatial0, expected)?;
        check_len(SPATIAL_Y_COLUMN, spatial1, expected)?;
        if let Some(col) = spatial2 {
            check_len(SPATIAL_Z_COLUMN, col, expected)?;
        }
        Ok(Self {
            spatial0: spatial0.numeric(),
            spatial1: spatial1.numeric(),
            spatial2: spatial2.map(Column::numeric),
            clusters: clusters.labels(),
        })
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Normalized `(s0, s1, s2)` for one cell.
    pub fn spatial(&self, index: usize) -> [f64; 3] {
        let z = self
            .spatial2
            .as_ref()
            .and_then(|col| col.get(index).copied())
            .unwrap_or(0.0);
        [self.spatial0[index], self.spatial1[index], z]
    }

    pub fn cluster(&self, index: usize) -> Option<&str> {
        self.clusters.get(index).map(String::as_str)
    }
}

fn check_len(name: &str, column: &Column, expected: usize) -> Result<(), FormatError> {
    if column.len() == expected {
        Ok(())
    } else {
        Err(FormatError::ColumnLength {
            column: name.to_string(),
            got: column.len(),
            expected,
        })
    }
}
