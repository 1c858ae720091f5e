use std::fmt;

/// Dataset-specific layout and encoding rules, keyed by the API prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatasetProfile {
    /// Flat 2D section with a dimmed background layer; gene vectors are
    /// served in a different order and must be reordered.
    Moe,
    /// Free-orbit 3D volume with orientation labels.
    Ob,
    #[default]
    Default,
}

impl DatasetProfile {
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "moe" => DatasetProfile::Moe,
            "ob" => DatasetProfile::Ob,
            _ => DatasetProfile::Default,
        }
    }

    pub fn has_background_layer(self) -> bool {
        self == DatasetProfile::Moe
    }

    pub fn reorders_genes(self) -> bool {
        self == DatasetProfile::Moe
    }
}

impl fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatasetProfile::Moe => "moe",
            DatasetProfile::Ob => "ob",
            DatasetProfile::Default => "default",
        })
    }
}
