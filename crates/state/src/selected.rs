use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{CELLTYPE_PARAM, GENE_PARAM, MODE_PARAM, QueryParams};

/// Gene selection mode of the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeneMode {
    /// One gene at a time, coolwarm colormap.
    #[default]
    Single,
    /// Up to two genes blended green/magenta.
    Multi,
}

impl GeneMode {
    pub fn from_number(n: f64) -> Option<Self> {
        if n == 1.0 {
            Some(GeneMode::Single)
        } else if n == 2.0 {
            Some(GeneMode::Multi)
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        match self {
            GeneMode::Single => 1,
            GeneMode::Multi => 2,
        }
    }
}

/// Which encoding currently drives the point colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Showing {
    #[default]
    Celltype,
    Gene,
}

/// User selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedState {
    pub selected_celltypes: Vec<String>,
    pub mode: GeneMode,
    pub selected_single_gene: String,
    pub selected_genes: Vec<String>,
    pub showing: Showing,
}

impl SelectedState {
    /// Restores selections from URL parameters. Malformed values are logged
    /// and ignored.
    pub fn from_query(query: &QueryParams) -> Self {
        let mut state = Self::default();
        match query.number(MODE_PARAM) {
            Ok(Some(n)) => match GeneMode::from_number(n) {
                Some(mode) => state.mode = mode,
                None => warn!(mode = n, "unknown gene mode in query"),
            },
            Ok(None) => {}
            Err(err) => warn!(%err, "ignoring mode parameter"),
        }
        match query.list(CELLTYPE_PARAM) {
            Ok(Some(celltypes)) => state.update_celltypes(celltypes),
            Ok(None) => {}
            Err(err) => warn!(%err, "ignoring celltype parameter"),
        }
        match query.list(GENE_PARAM) {
            Ok(Some(genes)) => {
                if let Some(first) = genes.first() {
                    state.selected_single_gene = first.clone();
                }
                state.update_genes(genes);
            }
            Ok(None) => {}
            Err(err) => warn!(%err, "ignoring gene parameter"),
        }
        state
    }

    /// Adds the cell type, or removes it when already selected.
    pub fn toggle_celltype(&mut self, celltype: &str) {
        if let Some(pos) = self.selected_celltypes.iter().position(|c| c == celltype) {
            self.selected_celltypes.remove(pos);
        } else {
            self.selected_celltypes.push(celltype.to_string());
        }
        debug!(celltypes = ?self.selected_celltypes, "celltype toggled");
    }

    /// Replaces the selection; duplicates keep their first position.
    pub fn update_celltypes(&mut self, celltypes: Vec<String>) {
        let mut seen = HashSet::new();
        self.selected_celltypes = celltypes
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
    }

    pub fn update_mode(&mut self, mode: GeneMode) {
        self.mode = mode;
    }

    pub fn update_single_gene(&mut self, gene: impl Into<String>) {
        self.selected_single_gene = gene.into();
    }

    pub fn update_genes(&mut self, genes: Vec<String>) {
        self.selected_genes = genes;
    }

    pub fn update_showing(&mut self, showing: Showing) {
        self.showing = showing;
    }

    /// Removes the first occurrence of `gene` (badge delete). Returns whether
    /// anything was removed.
    pub fn remove_gene(&mut self, gene: &str) -> bool {
        match self.selected_genes.iter().position(|g| g == gene) {
            Some(pos) => {
                self.selected_genes.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Writes the selection-derived parameters into `query`.
    pub fn write_query(&self, query: &mut QueryParams) {
        query.set_list(CELLTYPE_PARAM, &self.selected_celltypes);
        query.set_list(GENE_PARAM, &self.selected_genes);
        query.set(MODE_PARAM, self.mode.number().to_string());
    }
}
