//! Hover tracking and the tooltip model shown next to the hovered point.

use foundation::Rgb8;
use foundation::math::Vec2;
use formats::Palette;

use crate::{PerspectiveCamera, PickHit, Viewport};

/// Tooltip offset from the projected point, in pixels.
pub const TOOLTIP_OFFSET_PX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub color: Rgb8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverEvent {
    /// The pointer moved onto a different point.
    Entered { index: usize, tooltip: Option<Tooltip> },
    /// The pointer left every point.
    Left,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    hovered: Option<usize>,
    tooltip: Option<Tooltip>,
}

impl HoverState {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Feeds the nearest hit of this frame. Returns an event only when the
    /// hovered point changes.
    pub fn update(
        &mut self,
        hit: Option<&PickHit>,
        clusters: &[String],
        palette: &Palette,
        camera: &PerspectiveCamera,
        viewport: Viewport,
    ) -> Option<HoverEvent> {
        let Some(hit) = hit else {
            self.tooltip = None;
            return self.hovered.take().map(|_| HoverEvent::Left);
        };
        if self.hovered == Some(hit.index) {
            return None;
        }
        self.hovered = Some(hit.index);

        let label = clusters.get(hit.index).map(String::as_str).unwrap_or_default();
        self.tooltip = if label.is_empty() {
            None
        } else {
            camera.project_to_ndc(hit.point).map(|ndc| {
                let px = viewport.ndc_to_screen(ndc);
                Tooltip {
                    x: px.x + TOOLTIP_OFFSET_PX,
                    y: px.y + TOOLTIP_OFFSET_PX,
                    label: label.to_string(),
                    color: palette.color_or_fallback(label),
                }
            })
        };
        Some(HoverEvent::Entered {
            index: hit.index,
            tooltip: self.tooltip.clone(),
        })
    }

    /// Cluster of the hovered point, for click handling.
    pub fn hovered_cluster<'a>(&self, clusters: &'a [String]) -> Option<&'a str> {
        self.hovered
            .and_then(|i| clusters.get(i))
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }
}

/// Hover only runs once the pointer has actually moved over the canvas.
pub fn hover_active(mouse_ndc: Vec2) -> bool {
    !mouse_ndc.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OVERHEAD_POSITION;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn hit(index: usize, point: Vec3) -> PickHit {
        PickHit {
            index,
            distance: 300.0,
            distance_to_ray_sq: 0.0,
            point,
        }
    }

    fn fixture() -> (Vec<String>, Palette, PerspectiveCamera, Viewport) {
        let clusters = vec!["Astro".to_string(), String::new(), "Micro".to_string()];
        let palette = Palette::from_hex_pairs([("Astro", "#ff0000")]);
        let camera = PerspectiveCamera::new(OVERHEAD_POSITION, Vec3::ZERO, 1.0);
        (clusters, palette, camera, Viewport::new(400.0, 400.0))
    }

    #[test]
    fn entering_point_places_tooltip_offset_from_projection() {
        let (clusters, palette, camera, vp) = fixture();
        let mut hover = HoverState::default();
        let event = hover.update(Some(&hit(0, Vec3::ZERO)), &clusters, &palette, &camera, vp);
        let expected = Tooltip {
            x: 210.0,
            y: 210.0,
            label: "Astro".to_string(),
            color: Rgb8::new(255, 0, 0),
        };
        assert_eq!(
            event,
            Some(HoverEvent::Entered {
                index: 0,
                tooltip: Some(expected.clone())
            })
        );
        assert_eq!(hover.tooltip(), Some(&expected));
        // Same point again: no event.
        assert_eq!(hover.update(Some(&hit(0, Vec3::ZERO)), &clusters, &palette, &camera, vp), None);
    }

    #[test]
    fn unknown_cluster_uses_fallback_color() {
        let (clusters, palette, camera, vp) = fixture();
        let mut hover = HoverState::default();
        hover.update(Some(&hit(2, Vec3::ZERO)), &clusters, &palette, &camera, vp);
        assert_eq!(hover.tooltip().map(|t| t.color), Some(Rgb8::new(0x5e, 0x5e, 0x5e)));
    }

    #[test]
    fn empty_cluster_and_leaving_hide_tooltip() {
        let (clusters, palette, camera, vp) = fixture();
        let mut hover = HoverState::default();
        hover.update(Some(&hit(0, Vec3::ZERO)), &clusters, &palette, &camera, vp);
        let event = hover.update(Some(&hit(1, Vec3::ZERO)), &clusters, &palette, &camera, vp);
        assert_eq!(event, Some(HoverEvent::Entered { index: 1, tooltip: None }));
        assert_eq!(hover.hovered_cluster(&clusters), None);

        assert_eq!(hover.update(None, &clusters, &palette, &camera, vp), Some(HoverEvent::Left));
        assert_eq!(hover.update(None, &clusters, &palette, &camera, vp), None);
        assert_eq!(hover.hovered(), None);
    }

    #[test]
    fn hover_waits_for_pointer() {
        assert!(!hover_active(Vec2::new(0.0, 0.0)));
        assert!(hover_active(Vec2::new(0.0, 0.1)));
    }
}
