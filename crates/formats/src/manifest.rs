use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FormatError, Palette};

pub const MANIFEST_VERSION: &str = "1.0";

/// Session description for a set of datasets served by one expression API:
/// which prefixes exist, how they are labelled, their cluster palette and,
/// for datasets whose gene vectors arrive in a different order, the
/// permutation that restores cell order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetManifest {
    pub version: String,
    pub prefix: String,
    #[serde(default)]
    pub prefix_options: Vec<String>,
    /// Display name -> API prefix.
    #[serde(default)]
    pub prefix_mapping: BTreeMap<String, String>,
    /// Cluster -> `#rrggbb`.
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reorder: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiEndpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub dbname: String,
    pub username: String,
}

impl DatasetManifest {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            prefix: prefix.into(),
            prefix_options: Vec::new(),
            prefix_mapping: BTreeMap::new(),
            palette: BTreeMap::new(),
            reorder: Vec::new(),
            api: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn palette(&self) -> Palette {
        Palette::from_hex_pairs(
            self.palette
                .iter()
                .map(|(cluster, hex)| (cluster.as_str(), hex.as_str())),
        )
    }
}
