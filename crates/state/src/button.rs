use foundation::math::{Vec3, clamp};
use tracing::debug;

/// Slider and camera values shared between the control panel and the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonState {
    pub dot_size: f64,
    pub min_dot_size: f64,
    pub max_dot_size: f64,
    /// Horizontal offset of the embedding layout from the spatial layout.
    pub offset_umap: f64,
    /// Fraction in `[0, 1]` used as the normalisation percentile.
    pub gene_percentile: f64,

    /// Expression range of the last gene encoding.
    pub min_gene_value: f64,
    pub max_gene_value: f64,

    pub current_min_gene_value: f64,
    /// User override of the normalisation ceiling; `0` means none.
    pub current_gene_value: f64,
    pub current_max_gene_value: f64,

    pub camera_position: Vec3,
    pub target: Vec3,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            dot_size: 20.0,
            min_dot_size: 10.0,
            max_dot_size: 30.0,
            offset_umap: 10_000.0,
            gene_percentile: 0.99,
            min_gene_value: 0.0,
            max_gene_value: 0.0,
            current_min_gene_value: 0.0,
            current_gene_value: 0.0,
            current_max_gene_value: 0.0,
            camera_position: Vec3::new(80.65, -348.27, 72.20),
            target: Vec3::ZERO,
        }
    }
}

impl ButtonState {
    /// Sets the dot size, clamped to `[min_dot_size, max_dot_size]` and
    /// rounded to two decimals like the numeric input. Non-finite input is
    /// ignored. Returns the value now in effect.
    pub fn update_dot_size(&mut self, size: f64) -> f64 {
        if size.is_finite() {
            let clamped = clamp(size, self.min_dot_size, self.max_dot_size);
            self.dot_size = (clamped * 100.0).round() / 100.0;
        }
        self.dot_size
    }

    /// `percent` is on a 0..100 scale.
    pub fn update_gene_percentile(&mut self, percent: f64) {
        self.gene_percentile = percent * 0.01;
    }

    /// Records a new expression range; the current axis limits follow it.
    pub fn update_gene_expression_range(&mut self, min: f64, current: f64, max: f64) {
        debug!(min, current, max, "gene expression range");
        self.min_gene_value = min;
        self.max_gene_value = max;
        self.current_min_gene_value = min;
        self.current_gene_value = current;
        self.current_max_gene_value = max;
    }

    pub fn update_current_gene_value(&mut self, value: f64) {
        self.current_gene_value = value;
    }

    /// The user override, when one is set.
    pub fn gene_value_override(&self) -> Option<f64> {
        (self.current_gene_value > 0.0).then_some(self.current_gene_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_panel_initial_values() {
        let b = ButtonState::default();
        assert_eq!(b.dot_size, 20.0);
        assert_eq!((b.min_dot_size, b.max_dot_size), (10.0, 30.0));
        assert_eq!(b.gene_percentile, 0.99);
        assert_eq!(b.camera_position, Vec3::new(80.65, -348.27, 72.20));
        assert_eq!(b.gene_value_override(), None);
    }

    #[test]
    fn dot_size_is_clamped_and_rounded() {
        let mut b = ButtonState::default();
        assert_eq!(b.update_dot_size(4.0), 10.0);
        assert_eq!(b.update_dot_size(99.0), 30.0);
        assert_eq!(b.update_dot_size(12.346), 12.35);
        assert_eq!(b.update_dot_size(f64::NAN), 12.35);
    }

    #[test]
    fn percentile_is_stored_as_fraction() {
        let mut b = ButtonState::default();
        b.update_gene_percentile(95.0);
        assert!((b.gene_percentile - 0.95).abs() < 1e-12);
    }

    #[test]
    fn range_update_resets_current_limits() {
        let mut b = ButtonState::default();
        b.update_current_gene_value(7.0);
        b.update_gene_expression_range(1.0, 4.0, 9.0);
        assert_eq!(
            (b.current_min_gene_value, b.current_gene_value, b.current_max_gene_value),
            (1.0, 4.0, 9.0)
        );
        assert_eq!(b.gene_value_override(), Some(4.0));
    }
}
