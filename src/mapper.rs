//! Conversion between normalized curve space and canvas pixels.

use glam::Vec2;

use crate::curve::ControlPoint;

/// Maps curve space (`x` in `[0, 1]`, `y` in `[-1, 1]`) onto a canvas.
///
/// `y = -1` lands on the top edge of the canvas and `y = 1` on the bottom
/// edge. The playback driver flips the sign so that up means faster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    size: Vec2,
    /// Device pixel ratio of the backing surface
    pixel_density: f32,
}

impl CoordinateMapper {
    /// Smallest accepted viewport edge in pixels.
    pub const MIN_EXTENT: f32 = 1.0;

    pub fn new(width: f32, height: f32) -> Self {
        let mut mapper = Self {
            size: Vec2::ONE,
            pixel_density: 1.0,
        };
        mapper.resize(width, height, 1.0);
        mapper
    }

    /// Reconfigure for a new viewport. Degenerate sizes are floored to
    /// [`Self::MIN_EXTENT`] so the mapping never divides by zero.
    pub fn resize(&mut self, width: f32, height: f32, pixel_density: f32) {
        self.size = Vec2::new(sanitize_extent(width), sanitize_extent(height));
        self.pixel_density = if pixel_density.is_finite() && pixel_density > 0.0 {
            pixel_density
        } else {
            1.0
        };
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn pixel_density(&self) -> f32 {
        self.pixel_density
    }

    /// Size of the backing surface in physical pixels.
    pub fn physical_size(&self) -> Vec2 {
        self.size * self.pixel_density
    }

    pub fn to_screen(&self, point: ControlPoint) -> Vec2 {
        Vec2::new(
            self.size.x * point.x,
            (point.y + 1.0) * 0.5 * self.size.y,
        )
    }

    /// Inverse of [`Self::to_screen`]. The result is not clamped.
    pub fn to_normalized(&self, screen: Vec2) -> ControlPoint {
        ControlPoint::new(screen.x / self.size.x, screen.y * 2.0 / self.size.y - 1.0)
    }

    /// Horizontal pixel position of a normalized time value.
    pub fn time_to_screen_x(&self, t: f32) -> f32 {
        t * self.size.x
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(600.0, 280.0)
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(CoordinateMapper::MIN_EXTENT)
    } else {
        CoordinateMapper::MIN_EXTENT
    }
}
