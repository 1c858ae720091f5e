//! Camera controls.
//!
//! - Free orbit around the target for volumetric datasets
//! - Pan on left drag and dolly toward the cursor for flat sections
//! - Damped motion: each update applies a fraction of the pending motion

use std::f64::consts::PI;

use foundation::math::{Vec2, Vec3, clamp};
use formats::DatasetProfile;

use crate::{PerspectiveCamera, Viewport};

/// Fraction of pending motion applied per update.
pub const DAMPING_FACTOR: f64 = 0.25;

/// Dolly scale per wheel notch.
const DOLLY_STEP: f64 = 0.95;

/// Below this, pending motion is dropped.
const REST_EPSILON: f64 = 1e-6;

/// Keeps the polar angle away from the poles.
const POLAR_EPSILON: f64 = 1e-6;

const MIN_DISTANCE: f64 = 1.0;
const MAX_DISTANCE: f64 = 9_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControlMode {
    /// Rotate on left drag, pan on right drag.
    Orbit,
    /// Pan on left drag; rotation disabled.
    PanDolly,
}

impl ControlMode {
    pub fn for_profile(profile: DatasetProfile) -> Self {
        match profile {
            DatasetProfile::Ob => ControlMode::Orbit,
            _ => ControlMode::PanDolly,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraControls {
    mode: ControlMode,
    drag: Drag,
    last_px: Vec2,
    /// Pending azimuth/polar rotation in radians.
    rotate_delta: Vec2,
    /// Pending world-space translation of eye and target.
    pan_delta: Vec3,
    /// Pending log-scale dolly; negative moves closer.
    dolly_delta: f64,
    /// World point the dolly moves toward.
    dolly_anchor: Option<Vec3>,
}

impl CameraControls {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            drag: Drag::None,
            last_px: Vec2::default(),
            rotate_delta: Vec2::default(),
            pan_delta: Vec3::ZERO,
            dolly_delta: 0.0,
            dolly_anchor: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Handle pointer down event.
    ///
    /// - `button`: Which button was pressed (0=left, 1=middle, 2=right).
    pub fn on_pointer_down(&mut self, pos_px: Vec2, button: i32) {
        self.drag = match (self.mode, button) {
            (ControlMode::Orbit, 0) => Drag::Rotate,
            (ControlMode::Orbit, 2) => Drag::Pan,
            (ControlMode::PanDolly, 0) => Drag::Pan,
            _ => Drag::None,
        };
        self.last_px = pos_px;
    }

    pub fn on_pointer_move(&mut self, pos_px: Vec2, camera: &PerspectiveCamera, viewport: Viewport) {
        let delta = pos_px - self.last_px;
        self.last_px = pos_px;
        match self.drag {
            Drag::None => {}
            Drag::Rotate => {
                self.rotate_delta.x -= 2.0 * PI * delta.x / viewport.height;
                self.rotate_delta.y -= 2.0 * PI * delta.y / viewport.height;
            }
            Drag::Pan => {
                // World units per pixel at the target's depth.
                let scale = 2.0 * camera.distance_to_target() * (camera.fov_y_deg.to_radians() * 0.5).tan()
                    / viewport.height;
                let b = camera.basis();
                self.pan_delta = self.pan_delta + b.right.scale(-delta.x * scale) + b.up.scale(delta.y * scale);
            }
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.drag = Drag::None;
    }

    /// Handle mouse wheel event.
    ///
    /// - `delta`: Wheel delta (positive = zoom out, negative = zoom in).
    /// - `cursor_ndc`: Cursor position, used to dolly toward what is under it.
    pub fn on_wheel(&mut self, delta: f64, cursor_ndc: Option<Vec2>, camera: &PerspectiveCamera) {
        if delta == 0.0 {
            return;
        }
        let steps = delta.signum();
        self.dolly_delta -= steps * DOLLY_STEP.ln();
        if self.mode == ControlMode::PanDolly {
            self.dolly_anchor = cursor_ndc.map(|ndc| {
                let ray = camera.ray_from_ndc(ndc);
                let depth = camera.distance_to_target();
                let along = ray.dir.dot(camera.basis().forward).max(1e-6);
                ray.at(depth / along)
            });
        }
    }

    /// Applies one damped step to `camera`. Returns `true` while motion is
    /// still pending.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let pan = self.pan_delta.scale(DAMPING_FACTOR);
        camera.position = camera.position + pan;
        camera.target = camera.target + pan;
        self.pan_delta = self.pan_delta - pan;

        if self.mode == ControlMode::Orbit {
            let step = Vec2::new(self.rotate_delta.x * DAMPING_FACTOR, self.rotate_delta.y * DAMPING_FACTOR);
            orbit(camera, step);
            self.rotate_delta = self.rotate_delta - step;
        } else {
            self.rotate_delta = Vec2::default();
        }

        let dolly = self.dolly_delta * DAMPING_FACTOR;
        if dolly != 0.0 {
            dolly_camera(camera, dolly.exp(), self.dolly_anchor);
        }
        self.dolly_delta -= dolly;

        let pending = self.pan_delta.length() > REST_EPSILON
            || self.rotate_delta.x.abs() > REST_EPSILON
            || self.rotate_delta.y.abs() > REST_EPSILON
            || self.dolly_delta.abs() > REST_EPSILON;
        if !pending {
            self.pan_delta = Vec3::ZERO;
            self.rotate_delta = Vec2::default();
            self.dolly_delta = 0.0;
            self.dolly_anchor = None;
        }
        pending
    }
}

/// Rotates the eye around the target; `step.x` is azimuth, `step.y` polar.
fn orbit(camera: &mut PerspectiveCamera, step: Vec2) {
    if step.is_zero() {
        return;
    }
    let offset = camera.position - camera.target;
    let radius = offset.length();
    if radius == 0.0 {
        return;
    }
    let theta = offset.x.atan2(offset.z) + step.x;
    let phi = clamp(
        (offset.y / radius).clamp(-1.0, 1.0).acos() + step.y,
        POLAR_EPSILON,
        PI - POLAR_EPSILON,
    );
    let offset = Vec3::new(
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
        radius * phi.sin() * theta.cos(),
    );
    camera.position = camera.target + offset;
}

/// Scales the eye-target distance by `scale`, shifting the target toward
/// `anchor` by the same proportion so the anchor stays under the cursor.
fn dolly_camera(camera: &mut PerspectiveCamera, scale: f64, anchor: Option<Vec3>) {
    let offset = camera.position - camera.target;
    let radius = offset.length();
    if radius == 0.0 {
        return;
    }
    let new_radius = clamp(radius * scale, MIN_DISTANCE, MAX_DISTANCE);
    if let Some(anchor) = anchor {
        let shift = (anchor - camera.target).scale(1.0 - new_radius / radius);
        camera.target = camera.target + shift;
    }
    camera.position = camera.target + offset.scale(new_radius / radius);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OVERHEAD_POSITION;

    fn settle(controls: &mut CameraControls, camera: &mut PerspectiveCamera) {
        for _ in 0..200 {
            if !controls.update(camera) {
                break;
            }
        }
    }

    #[test]
    fn profile_selects_mode() {
        assert_eq!(ControlMode::for_profile(DatasetProfile::Ob), ControlMode::Orbit);
        assert_eq!(ControlMode::for_profile(DatasetProfile::Moe), ControlMode::PanDolly);
    }

    #[test]
    fn damping_applies_a_quarter_per_update() {
        let mut camera = PerspectiveCamera::new(OVERHEAD_POSITION, Vec3::ZERO, 1.0);
        let mut controls = CameraControls::new(ControlMode::PanDolly);
        let vp = Viewport::new(600.0, 600.0);
        controls.on_pointer_down(Vec2::new(300.0, 300.0), 0);
        controls.on_pointer_move(Vec2::new(200.0, 300.0), &camera, vp);
        controls.on_pointer_up();

        let start = camera.position.x;
        controls.update(&mut camera);
        let first = camera.position.x - start;
        controls.update(&mut camera);
        let second = camera.position.x - start - first;
        assert!(first > 0.0, "dragging left pans the view right");
        assert!((second / first - (1.0 - DAMPING_FACTOR)).abs() < 1e-9);
        assert_eq!(camera.position.z, 300.0);
    }

    #[test]
    fn pan_mode_never_rotates() {
        let mut camera = PerspectiveCamera::new(OVERHEAD_POSITION, Vec3::ZERO, 1.0);
        let mut controls = CameraControls::new(ControlMode::PanDolly);
        let vp = Viewport::default();
        controls.on_pointer_down(Vec2::new(10.0, 10.0), 2);
        controls.on_pointer_move(Vec2::new(300.0, 200.0), &camera, vp);
        settle(&mut controls, &mut camera);
        assert_eq!(camera.position, OVERHEAD_POSITION);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let start = Vec3::new(80.65, -348.27, 72.20);
        let mut camera = PerspectiveCamera::new(start, Vec3::ZERO, 1.0);
        let mut controls = CameraControls::new(ControlMode::Orbit);
        let vp = Viewport::default();
        controls.on_pointer_down(Vec2::new(100.0, 100.0), 0);
        controls.on_pointer_move(Vec2::new(180.0, 140.0), &camera, vp);
        settle(&mut controls, &mut camera);
        assert!((camera.position.length() - start.length()).abs() < 1e-6);
        assert!((camera.position - start).length() > 1.0);
    }

    #[test]
    fn wheel_dolly_toward_cursor_moves_target() {
        let mut camera = PerspectiveCamera::new(OVERHEAD_POSITION, Vec3::ZERO, 1.0);
        let mut controls = CameraControls::new(ControlMode::PanDolly);
        controls.on_wheel(-100.0, Some(Vec2::new(0.5, 0.0)), &camera);
        settle(&mut controls, &mut camera);
        // Zoomed in by one step toward a point right of center.
        assert!((camera.distance_to_target() - 300.0 * DOLLY_STEP).abs() < 1e-3);
        assert!(camera.target.x > 0.0);
        assert!(camera.target.z.abs() < 1e-9);
    }
}
