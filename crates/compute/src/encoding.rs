//! Selection-to-attribute encoding.
//!
//! Encoders turn the current selection (expression vectors or cell types)
//! into one color, size and alpha per point. A size or alpha of `-1` marks a
//! point the renderer must not draw.

use std::collections::HashMap;

use foundation::{CategorySet, Rgb8};
use formats::{DatasetProfile, Palette};
use tracing::{debug, warn};

use crate::{ComputeError, Statistics, coolwarm, dual_gene};

pub const HIDDEN: f32 = -1.0;
pub const UNSELECTED_COLOR: Rgb8 = Rgb8::new(0x1c, 0x1c, 0x1c);

/// Percentile used for the lower bound of the gene slider.
const SLIDER_MIN_PERCENTILE: f64 = 0.8;

/// Per-point attributes for the main layer, plus the background layer's
/// alpha when the encoding drives it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedAttributes {
    pub colors: Vec<Rgb8>,
    pub sizes: Vec<f32>,
    pub alphas: Vec<f32>,
    pub background_alphas: Option<Vec<f32>>,
}

impl EncodedAttributes {
    fn with_capacity(n: usize) -> Self {
        Self {
            colors: Vec::with_capacity(n),
            sizes: Vec::with_capacity(n),
            alphas: Vec::with_capacity(n),
            background_alphas: None,
        }
    }

    fn push(&mut self, color: Rgb8, size: f32, alpha: f32) {
        self.colors.push(color);
        self.sizes.push(size);
        self.alphas.push(alpha);
    }

    fn push_hidden(&mut self) {
        self.push(Rgb8::BLACK, HIDDEN, HIDDEN);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.sizes
            .iter()
            .zip(&self.alphas)
            .filter(|(s, a)| **s > 0.0 && **a > 0.0)
            .count()
    }
}

/// Expression range of a gene encoding, for colorbar labels and the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneRange {
    /// 80th percentile of the first gene.
    pub min_value: f64,
    /// Normalisation ceiling actually used for the first gene.
    pub current: f64,
    /// Largest value of the first gene (at least 0).
    pub max: f64,
    /// Ceiling used for the second gene, if any.
    pub second_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneEncoding {
    pub attributes: EncodedAttributes,
    pub range: GeneRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneEncoder {
    profile: DatasetProfile,
    percentile: f64,
    ceiling_override: Option<f64>,
}

impl GeneEncoder {
    pub fn new(profile: DatasetProfile) -> Self {
        Self {
            profile,
            percentile: 0.99,
            ceiling_override: None,
        }
    }

    /// Fraction in `[0, 1]`.
    pub fn with_percentile(mut self, p: f64) -> Self {
        self.percentile = p;
        self
    }

    /// User-chosen ceiling for the first gene. Ignored unless positive.
    pub fn with_ceiling_override(mut self, value: Option<f64>) -> Self {
        self.ceiling_override = value.filter(|v| *v > 0.0);
        self
    }

    /// Encodes one gene with the coolwarm map, or the first two with the
    /// dual-gene blend. Further genes are ignored.
    pub fn encode(&self, genes: &[&[f64]], clusters: &[String]) -> Result<GeneEncoding, ComputeError> {
        let n = clusters.len();
        let (&g1, rest) = genes.split_first().ok_or(ComputeError::NoGenes)?;
        check_len("first gene", g1, n)?;
        if rest.len() > 1 {
            warn!(genes = genes.len(), "only the first two genes are encoded");
        }
        let g2 = match rest.first() {
            Some(&g2) => {
                check_len("second gene", g2, n)?;
                Some(g2)
            }
            None => None,
        };

        debug!(
            zeros = Statistics::count_zeros(g1),
            points = n,
            "encoding gene expression"
        );
        let min_value = Statistics::percentile(g1, SLIDER_MIN_PERCENTILE);
        let nmax1 = self
            .ceiling_override
            .unwrap_or_else(|| Statistics::percentile(g1, self.percentile));
        let max = Statistics::max_or_zero(g1);
        let norm1 = Statistics::normalize(g1, nmax1);

        let (norm2, second_max) = match g2 {
            Some(g2) => {
                let nmax2 = Statistics::percentile(g2, self.percentile);
                (Some(Statistics::normalize(g2, nmax2)), Some(nmax2))
            }
            None => (None, None),
        };

        let hide_annotated = self.profile == DatasetProfile::Ob;
        let mut attributes = EncodedAttributes::with_capacity(n);
        for (i, cluster) in clusters.iter().enumerate() {
            if hide_annotated && !cluster.is_empty() {
                attributes.push_hidden();
                continue;
            }
            let color = match &norm2 {
                Some(norm2) => dual_gene(norm1[i], norm2[i]),
                None => coolwarm(norm1[i]),
            };
            attributes.push(color, 1.0, 1.0);
        }

        Ok(GeneEncoding {
            attributes,
            range: GeneRange {
                min_value,
                current: nmax1,
                max,
                second_max,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelltypeEncoder {
    profile: DatasetProfile,
}

impl CelltypeEncoder {
    pub fn new(profile: DatasetProfile) -> Self {
        Self { profile }
    }

    /// Colors points by cluster. With a selection, unselected clusters are
    /// dimmed and the background layer is shown.
    pub fn encode(&self, clusters: &[String], palette: &Palette, selected: &[String]) -> EncodedAttributes {
        let moe = self.profile == DatasetProfile::Moe;
        let mut codes: HashMap<&str, u32> = HashMap::new();
        let point_codes: Vec<u32> = clusters
            .iter()
            .map(|cluster| {
                let next = codes.len() as u32;
                *codes.entry(cluster.as_str()).or_insert(next)
            })
            .collect();
        let chosen: CategorySet = selected
            .iter()
            .filter_map(|s| codes.get(s.as_str()).copied())
            .collect();
        debug!(
            clusters = codes.len(),
            selected = chosen.len(),
            "encoding cell types"
        );

        let mut attributes = EncodedAttributes::with_capacity(clusters.len());
        for (cluster, &code) in clusters.iter().zip(&point_codes) {
            if cluster.is_empty() {
                attributes.push_hidden();
                continue;
            }
            let color = palette.get(cluster).unwrap_or(UNSELECTED_COLOR);
            if selected.is_empty() {
                attributes.push(color, if moe { 1.0 } else { 2.0 }, 1.0);
            } else if chosen.contains(code) {
                attributes.push(color, 2.0, 1.0);
            } else {
                attributes.push(UNSELECTED_COLOR, 0.5, if moe { 0.0 } else { 0.5 });
            }
        }
        let background = if selected.is_empty() { 0.0 } else { 1.0 };
        attributes.background_alphas = Some(vec![background; clusters.len()]);
        attributes
    }
}

fn check_len(what: &'static str, values: &[f64], expected: usize) -> Result<(), ComputeError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ComputeError::LengthMismatch {
            what,
            got: values.len(),
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn palette() -> Palette {
        Palette::from_hex_pairs([("Astro", "#ff0000"), ("OPC", "#00ff00")])
    }

    #[test]
    fn single_gene_uses_percentile_ceiling() {
        let g1 = [0.0, 1.0, 2.0, 4.0];
        let clusters = labels(&["a", "a", "b", "b"]);
        let out = GeneEncoder::new(DatasetProfile::Default)
            .with_percentile(0.5)
            .encode(&[&g1], &clusters)
            .unwrap();
        // Sorted [0,1,2,4]; floor(4 * 0.5) = 2 -> ceiling 2.
        assert_eq!(out.range.current, 2.0);
        assert_eq!(out.range.min_value, 4.0);
        assert_eq!(out.range.max, 4.0);
        assert_eq!(out.range.second_max, None);
        assert_eq!(
            out.attributes.colors,
            vec![coolwarm(0.0), coolwarm(0.5), coolwarm(1.0), coolwarm(1.0)]
        );
        assert_eq!(out.attributes.sizes, vec![1.0; 4]);
        assert_eq!(out.attributes.alphas, vec![1.0; 4]);
        assert_eq!(out.attributes.background_alphas, None);
    }

    #[test]
    fn override_replaces_first_ceiling_only_when_positive() {
        let g1 = [0.0, 1.0, 2.0, 4.0];
        let clusters = labels(&["", "", "", ""]);
        let enc = GeneEncoder::new(DatasetProfile::Default).with_percentile(0.5);
        let out = enc.with_ceiling_override(Some(4.0)).encode(&[&g1], &clusters).unwrap();
        assert_eq!(out.range.current, 4.0);
        assert_eq!(out.attributes.colors[2], coolwarm(0.5));

        let out = enc.with_ceiling_override(Some(0.0)).encode(&[&g1], &clusters).unwrap();
        assert_eq!(out.range.current, 2.0);
    }

    #[test]
    fn two_genes_blend() {
        let g1 = [0.0, 2.0];
        let g2 = [3.0, 0.0];
        let clusters = labels(&["x", "y"]);
        let out = GeneEncoder::new(DatasetProfile::Default)
            .with_percentile(1.0)
            .encode(&[&g1, &g2], &clusters)
            .unwrap();
        assert_eq!(out.range.second_max, Some(3.0));
        assert_eq!(out.attributes.colors, vec![dual_gene(0.0, 1.0), dual_gene(1.0, 0.0)]);
    }

    #[test]
    fn ob_hides_annotated_points_in_gene_mode() {
        let g1 = [1.0, 1.0, 1.0];
        let clusters = labels(&["Mitral", "", "Granule"]);
        let out = GeneEncoder::new(DatasetProfile::Ob)
            .encode(&[&g1], &clusters)
            .unwrap();
        assert_eq!(out.attributes.sizes, vec![HIDDEN, 1.0, HIDDEN]);
        assert_eq!(out.attributes.alphas, vec![HIDDEN, 1.0, HIDDEN]);
        assert_eq!(out.attributes.colors[0], Rgb8::BLACK);
        assert_eq!(out.attributes.visible_count(), 1);
    }

    #[test]
    fn gene_length_mismatch_is_rejected() {
        let clusters = labels(&["a", "b"]);
        let err = GeneEncoder::new(DatasetProfile::Default)
            .encode(&[&[1.0]], &clusters)
            .unwrap_err();
        assert_eq!(
            err,
            ComputeError::LengthMismatch {
                what: "first gene",
                got: 1,
                expected: 2
            }
        );
        assert_eq!(
            GeneEncoder::new(DatasetProfile::Default).encode(&[], &clusters),
            Err(ComputeError::NoGenes)
        );
    }

    #[test]
    fn celltypes_without_selection() {
        let clusters = labels(&["Astro", "", "Unknown"]);
        let out = CelltypeEncoder::new(DatasetProfile::Default).encode(&clusters, &palette(), &[]);
        assert_eq!(
            out.colors,
            vec![Rgb8::new(255, 0, 0), Rgb8::BLACK, UNSELECTED_COLOR]
        );
        assert_eq!(out.sizes, vec![2.0, HIDDEN, 2.0]);
        assert_eq!(out.alphas, vec![1.0, HIDDEN, 1.0]);
        assert_eq!(out.background_alphas, Some(vec![0.0; 3]));

        let moe = CelltypeEncoder::new(DatasetProfile::Moe).encode(&clusters, &palette(), &[]);
        assert_eq!(moe.sizes, vec![1.0, HIDDEN, 1.0]);
    }

    #[test]
    fn celltypes_with_selection_dim_the_rest() {
        let clusters = labels(&["Astro", "OPC", ""]);
        let selected = labels(&["OPC"]);
        let out = CelltypeEncoder::new(DatasetProfile::Default).encode(&clusters, &palette(), &selected);
        assert_eq!(
            out.colors,
            vec![UNSELECTED_COLOR, Rgb8::new(0, 255, 0), Rgb8::BLACK]
        );
        assert_eq!(out.sizes, vec![0.5, 2.0, HIDDEN]);
        assert_eq!(out.alphas, vec![0.5, 1.0, HIDDEN]);
        assert_eq!(out.background_alphas, Some(vec![1.0; 3]));

        let moe = CelltypeEncoder::new(DatasetProfile::Moe).encode(&clusters, &palette(), &selected);
        assert_eq!(moe.alphas, vec![0.0, 1.0, HIDDEN]);
    }

    #[test]
    fn selection_matches_every_point_of_a_cluster() {
        let clusters = labels(&["Astro", "OPC", "Astro", "Micro", "OPC"]);
        // "Micro" has no palette entry; "Ghost" is not in the data.
        let selected = labels(&["Astro", "Micro", "Ghost"]);
        let out = CelltypeEncoder::new(DatasetProfile::Default).encode(&clusters, &palette(), &selected);
        assert_eq!(out.sizes, vec![2.0, 0.5, 2.0, 2.0, 0.5]);
        assert_eq!(out.alphas, vec![1.0, 0.5, 1.0, 1.0, 0.5]);
        assert_eq!(out.colors[3], UNSELECTED_COLOR);
        assert_eq!(out.colors[2], Rgb8::new(255, 0, 0));
    }
}
