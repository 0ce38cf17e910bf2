//! Render scene as the hand-off between editor and renderer.
//!
//! The editor builds one scene per frame from the curve; a [`Renderer`]
//! consumes it read-only. The same scene supplies the hit targets the edit
//! session tests pointer positions against.

use glam::Vec2;

use crate::curve::SpeedCurve;
use crate::mapper::CoordinateMapper;
use crate::session::{CursorHint, HitTarget};

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Read-only data for one render frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderScene {
    /// Logical canvas size in pixels
    pub viewport_size: Vec2,
    /// Device pixel ratio for the backing surface
    pub pixel_density: f32,
    /// Eased curve polyline in canvas pixels
    pub curve_path: Vec<Vec2>,
    /// One handle per control point, in curve order
    pub handles: Vec<HitTarget>,
    /// Playhead x position, if playback has a position
    pub playhead_x: Option<f32>,
    /// Region before the trimmed start
    pub trim_start: Option<Rect>,
    /// Region after the trimmed end
    pub trim_end: Option<Rect>,
    /// Ghost marker following the pointer
    pub ghost: Option<Vec2>,
    pub ghost_radius: f32,
    pub cursor: CursorHint,
}

impl RenderScene {
    /// Vertical pixel position of the baseline speed (`y = 0`).
    pub fn midline_y(&self) -> f32 {
        self.viewport_size.y * 0.5
    }
}

/// Drawing backend (canvas, GPU, test recorder, ...).
pub trait Renderer {
    fn draw(&mut self, scene: &RenderScene);
}

/// Handle geometry for every control point.
pub fn handle_targets(
    curve: &SpeedCurve,
    mapper: &CoordinateMapper,
    radius: f32,
) -> Vec<HitTarget> {
    curve
        .iter()
        .map(|(point, p)| HitTarget {
            center: mapper.to_screen(p),
            radius,
            point,
        })
        .collect()
}

/// Rectangles covering the trimmed-off parts of the timeline.
pub fn trim_regions(curve: &SpeedCurve, mapper: &CoordinateMapper) -> (Option<Rect>, Option<Rect>) {
    let Some((start, end)) = curve.active_window() else {
        return (None, None);
    };
    let size = mapper.size();

    let left = (start > 0.0).then(|| Rect {
        min: Vec2::ZERO,
        max: Vec2::new(mapper.time_to_screen_x(start), size.y),
    });
    let right = (end < 1.0).then(|| Rect {
        min: Vec2::new(mapper.time_to_screen_x(end), 0.0),
        max: size,
    });
    (left, right)
}

/// Per-frame inputs that live outside the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    pub handle_radius: f32,
    pub ghost_radius: f32,
    /// Polyline samples per segment
    pub curve_samples: usize,
    pub playhead: Option<f32>,
    pub ghost: Option<Vec2>,
    pub cursor: CursorHint,
}

pub fn build_scene(
    curve: &SpeedCurve,
    mapper: &CoordinateMapper,
    params: &SceneParams,
) -> RenderScene {
    let (trim_start, trim_end) = trim_regions(curve, mapper);
    RenderScene {
        viewport_size: mapper.size(),
        pixel_density: mapper.pixel_density(),
        curve_path: curve
            .sample(params.curve_samples)
            .into_iter()
            .map(|p| mapper.to_screen(p))
            .collect(),
        handles: handle_targets(curve, mapper, params.handle_radius),
        playhead_x: params
            .playhead
            .filter(|t| t.is_finite())
            .map(|t| mapper.time_to_screen_x(t)),
        trim_start,
        trim_end,
        ghost: params.ghost,
        ghost_radius: params.ghost_radius,
        cursor: params.cursor,
    }
}
