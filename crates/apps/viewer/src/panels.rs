//! UI panel models: plain data the filter/overlay panels render.

use compute::GeneRange;
use foundation::Rgb8;
use formats::Palette;
use state::{ButtonState, GeneMode, SelectedState};

/// Gene badges alternate between these, matching the dual-gene channels.
pub const GENE_BADGE_COLORS: [Rgb8; 2] = [Rgb8::new(0, 200, 0), Rgb8::new(255, 0, 255)];

/// Slider position used when the user has not picked a ceiling yet.
pub const SLIDER_DEFAULT_FRACTION: f64 = 0.99;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BadgeKind {
    Gene,
    Celltype,
}

/// A removable selection chip.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub kind: BadgeKind,
    pub label: String,
    /// `None` when the palette has no entry for a cell type.
    pub color: Option<Rgb8>,
}

pub fn gene_badges(genes: &[String]) -> Vec<Badge> {
    genes
        .iter()
        .enumerate()
        .map(|(i, gene)| Badge {
            kind: BadgeKind::Gene,
            label: gene.clone(),
            color: Some(GENE_BADGE_COLORS[i % 2]),
        })
        .collect()
}

pub fn celltype_badges(celltypes: &[String], palette: &Palette) -> Vec<Badge> {
    celltypes
        .iter()
        .map(|celltype| Badge {
            kind: BadgeKind::Celltype,
            label: celltype.clone(),
            color: palette.get(celltype),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarLabels {
    pub min: String,
    pub max: String,
}

impl ColorbarLabels {
    fn zero_to(max: f64) -> Self {
        Self {
            min: "0".to_string(),
            max: format!("{max:.2}"),
        }
    }
}

/// Which colorbars are shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Colorbars {
    Hidden,
    /// Coolwarm bar for a single gene.
    Single(ColorbarLabels),
    /// Green bar for the first gene, magenta for the second.
    Dual {
        green: ColorbarLabels,
        magenta: ColorbarLabels,
    },
}

impl Colorbars {
    pub fn for_genes(gene_count: usize, range: Option<&GeneRange>) -> Self {
        let Some(range) = range else {
            return Colorbars::Hidden;
        };
        match gene_count {
            0 => Colorbars::Hidden,
            1 => Colorbars::Single(ColorbarLabels::zero_to(range.current)),
            _ => Colorbars::Dual {
                green: ColorbarLabels::zero_to(range.current),
                magenta: ColorbarLabels::zero_to(range.second_max.unwrap_or(0.0)),
            },
        }
    }
}

/// The percentile toggle only applies to one gene in single-gene mode.
pub fn percentile_button_enabled(selected: &SelectedState) -> bool {
    selected.selected_genes.len() == 1 && selected.mode == GeneMode::Single
}

/// Gene-ceiling slider.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeneSlider {
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl GeneSlider {
    /// `None` until an encoding has produced a positive range.
    pub fn from_button(button: &ButtonState) -> Option<Self> {
        let (min, max) = (button.min_gene_value, button.max_gene_value);
        if min <= 0.0 && max <= 0.0 {
            return None;
        }
        let value = if button.current_gene_value > 0.0 {
            button.current_gene_value
        } else {
            min + (max - min) * SLIDER_DEFAULT_FRACTION
        };
        Some(Self { min, max, value })
    }
}

/// Everything the overlay needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelModel {
    pub gene_badges: Vec<Badge>,
    pub celltype_badges: Vec<Badge>,
    pub colorbars: Colorbars,
    pub percentile_enabled: bool,
    pub gene_slider: Option<GeneSlider>,
    pub dot_size: f64,
}

impl PanelModel {
    pub fn build(
        selected: &SelectedState,
        button: &ButtonState,
        palette: &Palette,
        range: Option<&GeneRange>,
    ) -> Self {
        let genes = &selected.selected_genes;
        Self {
            gene_badges: gene_badges(genes),
            celltype_badges: celltype_badges(&selected.selected_celltypes, palette),
            colorbars: Colorbars::for_genes(genes.len(), range),
            percentile_enabled: percentile_button_enabled(selected),
            gene_slider: GeneSlider::from_button(button),
            dot_size: button.dot_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn range(second: Option<f64>) -> GeneRange {
        GeneRange {
            min_value: 0.5,
            current: 4.0,
            max: 9.0,
            second_max: second,
        }
    }

    #[test]
    fn gene_badges_alternate_colors() {
        let colors: Vec<_> = gene_badges(&strings(&["Gad1", "Slc17a7", "Pvalb"]))
            .into_iter()
            .map(|b| b.color.unwrap().to_css())
            .collect();
        assert_eq!(colors, ["rgb(0, 200, 0)", "rgb(255, 0, 255)", "rgb(0, 200, 0)"]);
    }

    #[test]
    fn celltype_badges_use_palette() {
        let palette = Palette::from_hex_pairs([("Mitral", "#ff0000")]);
        let badges = celltype_badges(&strings(&["Mitral", "Granule"]), &palette);
        assert_eq!(badges[0].color, Some(Rgb8::new(255, 0, 0)));
        assert_eq!(badges[1].color, None);
        assert_eq!(badges[1].kind, BadgeKind::Celltype);
    }

    #[test]
    fn colorbars_follow_gene_count() {
        assert_eq!(Colorbars::for_genes(0, Some(&range(None))), Colorbars::Hidden);
        assert_eq!(Colorbars::for_genes(1, None), Colorbars::Hidden);
        assert_eq!(
            Colorbars::for_genes(1, Some(&range(None))),
            Colorbars::Single(ColorbarLabels {
                min: "0".into(),
                max: "4.00".into()
            })
        );
        match Colorbars::for_genes(2, Some(&range(Some(2.5)))) {
            Colorbars::Dual { green, magenta } => {
                assert_eq!(green.max, "4.00");
                assert_eq!(magenta.max, "2.50");
            }
            other => panic!("expected dual colorbars, got {other:?}"),
        }
    }

    #[test]
    fn percentile_button_needs_one_gene_in_single_mode() {
        let mut selected = SelectedState {
            selected_genes: strings(&["Gad1"]),
            ..SelectedState::default()
        };
        assert!(percentile_button_enabled(&selected));
        selected.mode = GeneMode::Multi;
        assert!(!percentile_button_enabled(&selected));
        selected.mode = GeneMode::Single;
        selected.selected_genes.push("Pvalb".into());
        assert!(!percentile_button_enabled(&selected));
    }

    #[test]
    fn slider_defaults_near_max_without_override() {
        let mut button = ButtonState::default();
        assert_eq!(GeneSlider::from_button(&button), None);

        button.min_gene_value = 1.0;
        button.max_gene_value = 101.0;
        let slider = GeneSlider::from_button(&button).unwrap();
        assert!((slider.value - 100.0).abs() < 1e-9);

        button.current_gene_value = 42.0;
        assert_eq!(GeneSlider::from_button(&button).unwrap().value, 42.0);
    }
}
