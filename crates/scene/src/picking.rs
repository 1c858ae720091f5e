use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Vec3, quadratic_ease_in};

use crate::PointLayer;
use crate::spatial::PointBvh;

/// Pick tolerance when the camera is close to the section.
pub const MIN_PICK_THRESHOLD: f64 = 0.2;
/// Pick tolerance when zoomed far out.
pub const MAX_PICK_THRESHOLD: f64 = 2.0;
const NEAR_DISTANCE: f64 = 50.0;
const FAR_DISTANCE: f64 = 500.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub index: usize,
    /// Distance from the ray origin to `point`.
    pub distance: f64,
    /// Squared distance between the point and the ray.
    pub distance_to_ray_sq: f64,
    /// Closest point on the ray to the picked point.
    pub point: Vec3,
}

/// World-space pick tolerance for a camera at height `camera_z`.
///
/// Constant below 50 and above 500, quadratic in between.
pub fn pick_threshold(camera_z: f64) -> f64 {
    if camera_z < NEAR_DISTANCE {
        MIN_PICK_THRESHOLD
    } else if camera_z > FAR_DISTANCE {
        MAX_PICK_THRESHOLD
    } else {
        let t = (camera_z - NEAR_DISTANCE) / (FAR_DISTANCE - NEAR_DISTANCE);
        MIN_PICK_THRESHOLD + quadratic_ease_in(t) * (MAX_PICK_THRESHOLD - MIN_PICK_THRESHOLD)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub threshold: f64,
    pub near: f64,
    pub far: f64,
}

impl PickOptions {
    /// Unbounded range along the ray, like a default three.js `Raycaster`.
    /// The camera's clip planes are not applied.
    pub fn unbounded(threshold: f64) -> Self {
        Self {
            threshold,
            near: 0.0,
            far: f64::INFINITY,
        }
    }
}

/// Ray picking over a point layer.
///
/// Ordering contract:
/// - Hits are sorted by distance along the ray; equal distances keep the
///   lower point index first.
///
/// Notes:
/// - A point hits when its squared distance to the ray is below
///   `threshold^2` and its projection lies within `[near, far]`.
/// - Hidden points (size or alpha `<= 0`) are skipped.
/// - The scene picks with `PickOptions::unbounded`, so only the threshold
///   limits hits; camera near/far clipping does not.
pub fn pick_points(layer: &PointLayer, bvh: &PointBvh, ray: Ray, opts: PickOptions) -> Vec<PickHit> {
    let Some(dir) = ray.dir.normalize() else {
        return Vec::new();
    };
    let ray = Ray::new(ray.origin, dir);
    let threshold_sq = opts.threshold * opts.threshold;

    let mut hits: Vec<PickHit> = bvh
        .query_ray(ray.origin, dir, opts.threshold, 0.0, opts.far + opts.threshold)
        .into_iter()
        .map(|i| i as usize)
        .filter(|&i| layer.is_visible(i))
        .filter_map(|index| {
            let p = *layer.positions.get(index)?;
            let t = (p - ray.origin).dot(dir).max(0.0);
            let closest = ray.at(t);
            let distance_to_ray_sq = (p - closest).length_squared();
            if distance_to_ray_sq >= threshold_sq {
                return None;
            }
            let distance = ray.origin.distance(closest);
            if distance < opts.near || distance > opts.far {
                return None;
            }
            Some(PickHit {
                index,
                distance,
                distance_to_ray_sq,
                point: closest,
            })
        })
        .collect();

    hits.sort_by(|a, b| stable_total_cmp_f64(a.distance, b.distance).then_with(|| a.index.cmp(&b.index)));
    hits
}
