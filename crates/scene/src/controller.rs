//! Frame-driven scene controller: owns the camera, controls, point layers
//! and hover state, and applies encoded attributes to the buffers.

use compute::EncodedAttributes;
use foundation::math::{Vec2, Vec3};
use formats::{CellTable, DatasetProfile, Palette};
use runtime::{Frame, Metrics, names};
use tracing::{debug, trace};

use crate::{
    CameraControls, ControlMode, HoverEvent, HoverState, LayerTarget, OrientationLabel, PerspectiveCamera,
    PickHit, PickOptions, PointBvh, PointCloud, SceneError, Viewport, adaptive_point_size, hover_active,
    orientation_labels, pick_points, pick_threshold,
};

/// Assumed frame delta until the host reports real timings.
const DEFAULT_DT_S: f64 = 1.0 / 60.0;

/// Initial scene parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneConfig {
    pub profile: DatasetProfile,
    /// Eye position used by the volumetric profile.
    pub camera_position: Vec3,
    pub target: Vec3,
    pub dot_size: f64,
    pub viewport: Viewport,
}

#[derive(Debug)]
pub struct SceneController {
    camera: PerspectiveCamera,
    controls: CameraControls,
    viewport: Viewport,
    cloud: PointCloud,
    bvh: PointBvh,
    clusters: Vec<String>,
    palette: Palette,
    dot_size: f64,
    mouse_ndc: Vec2,
    hover: HoverState,
    labels: Vec<OrientationLabel>,
    frame: Frame,
    metrics: Metrics,
    needs_redraw: bool,
}

impl SceneController {
    pub fn new(config: SceneConfig, cells: &CellTable, palette: Palette) -> Self {
        let cloud = PointCloud::from_cells(config.profile, cells, &palette);
        let bvh = PointBvh::build(&cloud.main().positions);
        let camera = PerspectiveCamera::initial(
            config.profile,
            config.camera_position,
            config.target,
            config.viewport.aspect(),
        );
        debug!(profile = %config.profile, points = cloud.len(), "scene created");
        Self {
            camera,
            controls: CameraControls::new(ControlMode::for_profile(config.profile)),
            viewport: config.viewport,
            cloud,
            bvh,
            clusters: cells.clusters.clone(),
            palette,
            dot_size: config.dot_size,
            mouse_ndc: Vec2::default(),
            hover: HoverState::default(),
            labels: orientation_labels(config.profile),
            frame: Frame::new(0, DEFAULT_DT_S),
            metrics: Metrics::new(),
            needs_redraw: true,
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn clusters(&self) -> &[String] {
        &self.clusters
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn labels(&self) -> &[OrientationLabel] {
        &self.labels
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn dot_size(&self) -> f64 {
        self.dot_size
    }

    /// Returns and clears the redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Writes encoded attributes into the point buffers.
    ///
    /// A length mismatch in any list rejects the update and leaves every
    /// buffer and version untouched.
    pub fn apply(&mut self, attributes: &EncodedAttributes) -> Result<(), SceneError> {
        let result = self.apply_inner(attributes);
        if result.is_err() {
            self.metrics.inc(names::REJECTED_WRITES);
        }
        self.needs_redraw = true;
        result
    }

    fn apply_inner(&mut self, attributes: &EncodedAttributes) -> Result<(), SceneError> {
        self.check_lengths(attributes)?;
        if self.cloud.update_colors(&attributes.colors)? {
            self.metrics.inc(names::COLOR_WRITES);
        }
        if self.cloud.update_sizes(&attributes.sizes)? {
            self.metrics.inc(names::SIZE_WRITES);
        }
        if self.cloud.update_alphas(&attributes.alphas, LayerTarget::Main)? {
            self.metrics.inc(names::ALPHA_WRITES);
        }
        match (&attributes.background_alphas, self.cloud.background().is_some()) {
            (Some(alphas), true) => {
                if self.cloud.update_alphas(alphas, LayerTarget::Background)? {
                    self.metrics.inc(names::ALPHA_WRITES);
                }
            }
            (Some(_), false) => trace!("no background layer; skipping background alphas"),
            (None, _) => {}
        }
        let main = self.cloud.main();
        let visible = (0..main.len()).filter(|&i| main.is_visible(i)).count();
        self.metrics
            .record_histogram(names::VISIBLE_POINTS, i64::try_from(visible).unwrap_or(i64::MAX));
        Ok(())
    }

    /// Rejects the whole update before any buffer is touched.
    fn check_lengths(&self, attributes: &EncodedAttributes) -> Result<(), SceneError> {
        let main = self.cloud.main();
        let lists = [
            ("color", attributes.colors.len()),
            ("size", attributes.sizes.len()),
            ("alpha", attributes.alphas.len()),
        ];
        for (attribute, got) in lists.into_iter().filter(|(_, got)| *got > 0) {
            main.check_len(attribute, got)?;
        }
        if let (Some(alphas), Some(background)) = (&attributes.background_alphas, self.cloud.background()) {
            if !alphas.is_empty() {
                background.check_len("background alpha", alphas.len())?;
            }
        }
        Ok(())
    }

    /// Updates the dot-size uniform.
    pub fn set_dot_size(&mut self, dot_size: f64) {
        if self.dot_size != dot_size {
            debug!(dot_size, "dot size uniform");
            self.dot_size = dot_size;
            self.needs_redraw = true;
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        self.needs_redraw = true;
    }

    pub fn pointer_down(&mut self, pos_px: Vec2, button: i32) {
        self.controls.on_pointer_down(pos_px, button);
    }

    pub fn pointer_moved(&mut self, pos_px: Vec2) {
        self.mouse_ndc = self.viewport.screen_to_ndc(pos_px);
        self.controls.on_pointer_move(pos_px, &self.camera, self.viewport);
    }

    pub fn pointer_up(&mut self) {
        self.controls.on_pointer_up();
    }

    pub fn wheel(&mut self, delta: f64) {
        let cursor = hover_active(self.mouse_ndc).then_some(self.mouse_ndc);
        self.controls.on_wheel(delta, cursor, &self.camera);
    }

    /// Nearest visible point under the cursor.
    pub fn pick_at_cursor(&mut self) -> Option<PickHit> {
        let ray = self.camera.ray_from_ndc(self.mouse_ndc);
        let opts = PickOptions::unbounded(pick_threshold(self.camera.position.z));
        let hit = pick_points(self.cloud.main(), &self.bvh, ray, opts).into_iter().next();
        self.metrics.inc(if hit.is_some() {
            names::PICK_HITS
        } else {
            names::PICK_MISSES
        });
        hit
    }

    /// Advances one frame: damped controls, then hover.
    pub fn tick(&mut self, dt_s: f64) -> Option<HoverEvent> {
        self.frame = self.frame.advance(dt_s);
        if self.controls.update(&mut self.camera) {
            self.needs_redraw = true;
        }
        if !hover_active(self.mouse_ndc) {
            return None;
        }
        let hit = self.pick_at_cursor();
        let event = self
            .hover
            .update(hit.as_ref(), &self.clusters, &self.palette, &self.camera, self.viewport);
        if let Some(event) = &event {
            trace!(frame = self.frame.index, ?event, "hover");
        }
        event
    }

    /// Cluster of the hovered point, if any.
    pub fn click(&self) -> Option<String> {
        let cluster = self.hover.hovered_cluster(&self.clusters)?;
        debug!(%cluster, "clicked point");
        Some(cluster.to_string())
    }

    /// On-screen diameter of point `index` in pixels.
    pub fn point_size_px(&self, index: usize) -> Option<f64> {
        let layer = self.cloud.main();
        let position = *layer.positions.get(index)?;
        Some(adaptive_point_size(
            f64::from(layer.sizes[index]),
            f64::from(layer.alphas[index]),
            self.dot_size,
            self.camera.view_depth(position),
        ))
    }
}
