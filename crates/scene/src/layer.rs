//! Point layers and their GPU-facing attribute buffers.
//!
//! Buffers are plain `Vec`s; every successful write bumps the attribute's
//! version so a renderer knows which buffers to re-upload.

use foundation::Rgb8;
use foundation::math::Vec3;
use formats::{CellTable, DatasetProfile, Palette};
use tracing::{debug, error};

use crate::SceneError;

/// Spatial coordinates are normalized; this maps them to scene units.
pub const SPATIAL_SCALE: f64 = 200.0;
pub const BACKGROUND_DEPTH: f64 = -0.05;
pub const BACKGROUND_GREY: f32 = 0.28;
pub const BACKGROUND_SIZE: f32 = 0.1;
pub const INITIAL_SIZE: f32 = 3.0;
/// Sizes for the flat section profile are scaled down before upload.
pub const MOE_SIZE_SCALE: f32 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerTarget {
    Main,
    Background,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AttributeVersions {
    pub position: u64,
    pub color: u64,
    pub size: u64,
    pub alpha: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointLayer {
    pub positions: Vec<Vec3>,
    pub colors: Vec<[f32; 3]>,
    pub sizes: Vec<f32>,
    pub alphas: Vec<f32>,
    pub versions: AttributeVersions,
}

impl PointLayer {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether the point at `index` is drawn at all.
    pub fn is_visible(&self, index: usize) -> bool {
        self.sizes.get(index).is_some_and(|s| *s > 0.0) && self.alphas.get(index).is_some_and(|a| *a > 0.0)
    }

    pub(crate) fn check_len(&self, attribute: &'static str, got: usize) -> Result<(), SceneError> {
        if got == self.len() {
            return Ok(());
        }
        error!(attribute, got, expected = self.len(), "attribute length mismatch");
        Err(SceneError::LengthMismatch {
            attribute,
            got,
            expected: self.len(),
        })
    }
}

/// The main point layer plus the optional dimmed background copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    profile: DatasetProfile,
    main: PointLayer,
    background: Option<PointLayer>,
}

impl PointCloud {
    /// Lays out one point per cell and colors it by cluster.
    pub fn from_cells(profile: DatasetProfile, cells: &CellTable, palette: &Palette) -> Self {
        let n = cells.len();
        let mut main = PointLayer {
            positions: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
            sizes: vec![INITIAL_SIZE; n],
            alphas: vec![1.0; n],
            versions: AttributeVersions::default(),
        };
        let mut background_positions = Vec::new();

        for i in 0..n {
            let [s0, s1, s2] = cells.spatial(i);
            let position = match profile {
                DatasetProfile::Moe => {
                    let p = Vec3::new(s1 * SPATIAL_SCALE, s0 * -SPATIAL_SCALE, 0.0);
                    background_positions.push(Vec3::new(p.x, p.y, BACKGROUND_DEPTH));
                    p
                }
                _ => Vec3::new(s0 * -SPATIAL_SCALE, s1 * -SPATIAL_SCALE, s2 * SPATIAL_SCALE),
            };
            main.positions.push(position);
            let cluster = cells.cluster(i).unwrap_or_default();
            main.colors.push(palette.color_or_fallback(cluster).to_unit());
        }

        let background = profile.has_background_layer().then(|| PointLayer {
            positions: background_positions,
            colors: vec![[BACKGROUND_GREY; 3]; n],
            sizes: vec![BACKGROUND_SIZE; n],
            alphas: vec![0.0; n],
            versions: AttributeVersions::default(),
        });

        debug!(%profile, points = n, background = background.is_some(), "point cloud built");
        Self {
            profile,
            main,
            background,
        }
    }

    pub fn profile(&self) -> DatasetProfile {
        self.profile
    }

    pub fn main(&self) -> &PointLayer {
        &self.main
    }

    pub fn background(&self) -> Option<&PointLayer> {
        self.background.as_ref()
    }

    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Replaces main-layer colors. Empty input is ignored and reports `false`.
    pub fn update_colors(&mut self, colors: &[Rgb8]) -> Result<bool, SceneError> {
        if colors.is_empty() {
            return Ok(false);
        }
        self.main.check_len("color", colors.len())?;
        self.main.colors = colors.iter().map(|c| c.to_unit()).collect();
        self.main.versions.color += 1;
        Ok(true)
    }

    /// Replaces main-layer sizes, applying the profile's size scale.
    pub fn update_sizes(&mut self, sizes: &[f32]) -> Result<bool, SceneError> {
        if sizes.is_empty() {
            return Ok(false);
        }
        self.main.check_len("size", sizes.len())?;
        let scale = if self.profile == DatasetProfile::Moe {
            MOE_SIZE_SCALE
        } else {
            1.0
        };
        self.main.sizes = sizes.iter().map(|s| s * scale).collect();
        self.main.versions.size += 1;
        Ok(true)
    }

    pub fn update_alphas(&mut self, alphas: &[f32], target: LayerTarget) -> Result<bool, SceneError> {
        if alphas.is_empty() {
            return Ok(false);
        }
        let layer = match target {
            LayerTarget::Main => &mut self.main,
            LayerTarget::Background => self.background.as_mut().ok_or(SceneError::MissingLayer(target))?,
        };
        layer.check_len("alpha", alphas.len())?;
        layer.alphas = alphas.to_vec();
        layer.versions.alpha += 1;
        Ok(true)
    }
}
