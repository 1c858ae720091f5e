use std::collections::BTreeMap;

use formats::{DatasetManifest, DatasetProfile, Palette};
use tracing::{debug, warn};

use crate::{PREFIX_PARAM, QueryParams};

pub const DEFAULT_API_URL: &str = "https://or-be-gz.merfisheyes.com";
pub const DEFAULT_DBNAME: &str = "genedb-or";
pub const DEFAULT_USERNAME: &str = "dulac";

/// Session configuration: which dataset is open and how to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiState {
    pub prefix: String,
    pub prefix_options: Vec<String>,
    /// Display name -> prefix.
    pub prefix_mapping: BTreeMap<String, String>,
    pub palette: Palette,
    pub reorder: Vec<usize>,
    pub base_url: String,
    pub dbname: String,
    pub username: String,
}

/// Outcome of picking a dataset from the prefix menu.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixChange {
    pub prefix: String,
    /// The chosen prefix differs from the open one; the session must reload.
    pub reload: bool,
    /// Query string reset to only the new prefix.
    pub query: QueryParams,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            prefix_options: Vec::new(),
            prefix_mapping: BTreeMap::new(),
            palette: Palette::new(),
            reorder: Vec::new(),
            base_url: DEFAULT_API_URL.to_string(),
            dbname: DEFAULT_DBNAME.to_string(),
            username: DEFAULT_USERNAME.to_string(),
        }
    }
}

impl ApiState {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn from_manifest(manifest: &DatasetManifest) -> Self {
        let mut state = Self {
            prefix: manifest.prefix.clone(),
            prefix_options: manifest.prefix_options.clone(),
            prefix_mapping: manifest.prefix_mapping.clone(),
            palette: manifest.palette(),
            reorder: manifest.reorder.clone(),
            ..Self::default()
        };
        if let Some(api) = &manifest.api {
            state.base_url = api.base_url.clone();
            state.dbname = api.dbname.clone();
            state.username = api.username.clone();
        }
        state
    }

    pub fn profile(&self) -> DatasetProfile {
        DatasetProfile::from_prefix(&self.prefix)
    }

    /// Display name for `prefix`, falling back to the prefix itself.
    pub fn display_name_for<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.prefix_mapping
            .iter()
            .find(|(_, p)| p.as_str() == prefix)
            .map(|(name, _)| name.as_str())
            .unwrap_or(prefix)
    }

    /// Resolves a menu entry. Unknown display names yield `None`.
    pub fn select_prefix(&self, display_name: &str) -> Option<PrefixChange> {
        let Some(prefix) = self.prefix_mapping.get(display_name) else {
            warn!(display_name, "no prefix mapped for display name");
            return None;
        };
        let mut query = QueryParams::new();
        query.append(PREFIX_PARAM, prefix.clone());
        let reload = *prefix != self.prefix;
        debug!(%prefix, reload, "prefix selected");
        Some(PrefixChange {
            prefix: prefix.clone(),
            reload,
            query,
        })
    }
}
