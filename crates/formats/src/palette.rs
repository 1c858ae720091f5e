use std::collections::HashMap;

use foundation::Rgb8;
use tracing::warn;

/// Grey used for points whose cluster has no palette entry.
pub const FALLBACK_COLOR: Rgb8 = Rgb8::new(0x5e, 0x5e, 0x5e);

/// Cluster label to color mapping. Categories keep first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    categories: Vec<String>,
    colors: HashMap<String, Rgb8>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs the `clusters` and `clusters_pal` value lists element by element.
    ///
    /// Entries whose color does not parse are skipped with a warning; extra
    /// items in the longer list are ignored.
    pub fn from_lists(clusters: &[String], colors: &[String]) -> Self {
        if clusters.len() != colors.len() {
            warn!(
                clusters = clusters.len(),
                colors = colors.len(),
                "palette lists differ in length"
            );
        }
        let mut palette = Self::new();
        for (cluster, color) in clusters.iter().zip(colors) {
            match Rgb8::parse(color) {
                Ok(rgb) => palette.insert(cluster.clone(), rgb),
                Err(err) => warn!(%cluster, %err, "skipping palette entry"),
            }
        }
        palette
    }

    /// Builds from `(cluster, "#rrggbb")` pairs, e.g. a session file.
    pub fn from_hex_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut palette = Self::new();
        for (cluster, hex) in pairs {
            match Rgb8::parse(hex) {
                Ok(rgb) => palette.insert(cluster.to_string(), rgb),
                Err(err) => warn!(%cluster, %err, "skipping palette entry"),
            }
        }
        palette
    }

    pub fn insert(&mut self, cluster: String, color: Rgb8) {
        if !self.colors.contains_key(&cluster) {
            self.categories.push(cluster.clone());
        }
        self.colors.insert(cluster, color);
    }

    pub fn get(&self, cluster: &str) -> Option<Rgb8> {
        self.colors.get(cluster).copied()
    }

    pub fn color_or_fallback(&self, cluster: &str) -> Rgb8 {
        self.get(cluster).unwrap_or(FALLBACK_COLOR)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
