use foundation::math::{Vec2, Vec3};
use formats::DatasetProfile;

use crate::picking::Ray;

pub const FOV_Y_DEG: f64 = 75.0;
pub const NEAR: f64 = 0.1;
pub const FAR: f64 = 10_000.0;

/// Default eye position for flat datasets: straight above the origin.
pub const OVERHEAD_POSITION: Vec3 = Vec3::new(0.0, 0.0, 300.0);

/// Canvas size in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Pixel position (origin top-left) to normalized device coordinates.
    pub fn screen_to_ndc(&self, px: Vec2) -> Vec2 {
        Vec2::new(
            (px.x / self.width) * 2.0 - 1.0,
            -(px.y / self.height) * 2.0 + 1.0,
        )
    }

    pub fn ndc_to_screen(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.width,
            (-ndc.y * 0.5 + 0.5) * self.height,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Right-handed perspective camera looking from `position` at `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

/// Orthonormal camera frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, target: Vec3, aspect: f64) -> Self {
        Self {
            position,
            target,
            up: Vec3::UP,
            fov_y_deg: FOV_Y_DEG,
            aspect,
            near: NEAR,
            far: FAR,
        }
    }

    /// Initial placement: the 3D volume profile starts from the saved
    /// camera position, everything else from overhead.
    pub fn initial(profile: DatasetProfile, saved_position: Vec3, target: Vec3, aspect: f64) -> Self {
        let position = match profile {
            DatasetProfile::Ob => saved_position,
            _ => OVERHEAD_POSITION,
        };
        Self::new(position, target, aspect)
    }

    pub fn basis(&self) -> CameraBasis {
        let forward = (self.target - self.position)
            .normalize()
            .unwrap_or(Vec3::new(0.0, 0.0, -1.0));
        let right = forward
            .cross(self.up)
            .normalize()
            .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let up = right.cross(forward);
        CameraBasis { right, up, forward }
    }

    fn tan_half_fov(&self) -> f64 {
        (self.fov_y_deg.to_radians() * 0.5).tan()
    }

    /// Distance in front of the camera along the view axis.
    pub fn view_depth(&self, point: Vec3) -> f64 {
        (point - self.position).dot(self.basis().forward)
    }

    /// World point to NDC. `None` for points at or behind the eye.
    pub fn project_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let b = self.basis();
        let d = point - self.position;
        let depth = d.dot(b.forward);
        if depth <= 0.0 {
            return None;
        }
        let t = self.tan_half_fov();
        Some(Vec2::new(
            d.dot(b.right) / (depth * t * self.aspect),
            d.dot(b.up) / (depth * t),
        ))
    }

    /// Ray from the eye through an NDC position; the direction is unit length.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let b = self.basis();
        let t = self.tan_half_fov();
        let dir = b.forward + b.right.scale(ndc.x * t * self.aspect) + b.up.scale(ndc.y * t);
        Ray::new(self.position, dir.normalize().unwrap_or(b.forward))
    }

    pub fn distance_to_target(&self) -> f64 {
        self.position.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn initial_position_depends_on_profile() {
        let saved = Vec3::new(80.65, -348.27, 72.20);
        let ob = PerspectiveCamera::initial(DatasetProfile::Ob, saved, Vec3::ZERO, 1.0);
        assert_eq!(ob.position, saved);
        let flat = PerspectiveCamera::initial(DatasetProfile::Moe, saved, Vec3::ZERO, 1.0);
        assert_eq!(flat.position, OVERHEAD_POSITION);
        assert_eq!((flat.fov_y_deg, flat.near, flat.far), (75.0, 0.1, 10_000.0));
    }

    #[test]
    fn target_projects_to_center_and_depth_is_distance() {
        let cam = PerspectiveCamera::new(OVERHEAD_POSITION, Vec3::ZERO, 1.5);
        let ndc = cam.project_to_ndc(Vec3::ZERO).unwrap();
        assert!(close(ndc.x, 0.0) && close(ndc.y, 0.0));
        assert!(close(cam.view_depth(Vec3::new(5.0, 5.0, 0.0)), 300.0));
        assert!(cam.project_to_ndc(Vec3::new(0.0, 0.0, 400.0)).is_none());
    }

    #[test]
    fn ray_through_projection_hits_the_point() {
        let cam = PerspectiveCamera::new(Vec3::new(10.0, -40.0, 250.0), Vec3::ZERO, 16.0 / 9.0);
        let p = Vec3::new(30.0, 12.0, -5.0);
        let ndc = cam.project_to_ndc(p).unwrap();
        let ray = cam.ray_from_ndc(ndc);
        let to_p = (p - ray.origin).normalize().unwrap();
        assert!(close(to_p.dot(ray.dir), 1.0));
    }

    #[test]
    fn screen_and_ndc_conversions_invert() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.screen_to_ndc(Vec2::new(400.0, 300.0)), Vec2::new(0.0, 0.0));
        assert_eq!(vp.ndc_to_screen(Vec2::new(-1.0, 1.0)), Vec2::new(0.0, 0.0));
        let px = Vec2::new(123.0, 456.0);
        let back = vp.ndc_to_screen(vp.screen_to_ndc(px));
        assert!(close(back.x, px.x) && close(back.y, px.y));
    }
}
