//! Anatomical orientation labels for the volumetric dataset.

use foundation::math::Vec3;
use formats::DatasetProfile;

pub const DEFAULT_LABEL_SCALE: f64 = 50.0;

/// A camera-facing text sprite anchored in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationLabel {
    pub text: &'static str,
    pub position: Vec3,
    /// Sprite size in world units; negative mirrors the sprite.
    pub scale: f64,
}

const fn label(text: &'static str, x: f64, y: f64, z: f64, scale: f64) -> OrientationLabel {
    OrientationLabel {
        text,
        position: Vec3::new(x, y, z),
        scale,
    }
}

const OB_LABELS: [OrientationLabel; 6] = [
    label("Dorsal", 170.0, 50.0, 130.0, DEFAULT_LABEL_SCALE),
    label("Ventral", -210.0, -50.0, -170.0, DEFAULT_LABEL_SCALE),
    label("Posterior", 100.0, -50.0, -200.0, DEFAULT_LABEL_SCALE),
    label("Anterior", -180.0, -50.0, 80.0, 50.0),
    label("Lateral", 0.0, -200.0, 0.0, 50.0),
    label("Medial", -50.0, 130.0, -50.0, -50.0),
];

/// Labels to place for `profile`; empty for flat sections.
pub fn orientation_labels(profile: DatasetProfile) -> Vec<OrientationLabel> {
    match profile {
        DatasetProfile::Ob => OB_LABELS.to_vec(),
        _ => Vec::new(),
    }
}
