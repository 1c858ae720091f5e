//! Screen-space point sizing.
//!
//! Mirrors the point vertex shader so hover, export and tests can reason
//! about on-screen sizes without a GPU.

use foundation::math::{clamp, cubic_ease_out, mix};

/// Lower values shrink points faster when zooming in.
pub const ZOOM_FACTOR: f64 = 150.0;
/// Base size multiplier applied to `size * dot_size`.
pub const BASE_SCALE: f64 = 0.4;
/// Depth range over which points grow from 1x to 2x.
pub const EASE_START: f64 = 100.0;
pub const EASE_RANGE: f64 = 200.0;

pub const MIN_SIZE_FLOOR: f64 = 0.5;
pub const MAX_SIZE_CEIL: f64 = 50.0;

/// Rendered point diameter in pixels.
///
/// `distance` is the view-space depth of the point. Points with a
/// non-positive size or alpha are not drawn and report `0`.
pub fn adaptive_point_size(size: f64, alpha: f64, dot_size: f64, distance: f64) -> f64 {
    if size <= 0.0 || alpha <= 0.0 {
        return 0.0;
    }
    let base = size * dot_size * BASE_SCALE;
    let min_size = MIN_SIZE_FLOOR.max(dot_size * 0.2);
    let max_size = MAX_SIZE_CEIL.min(dot_size * 6.0);

    let ratio = ZOOM_FACTOR / distance;
    let t = clamp((distance - EASE_START) / EASE_RANGE, 0.0, 1.0);
    let scale = mix(1.0, 2.0, cubic_ease_out(t));

    clamp(base * ratio * scale, min_size, max_size)
}
