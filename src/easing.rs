//! Easing functions for curve segments

use serde::{Deserialize, Serialize};

/// Shaping function applied to the local parameter of a curve segment.
///
/// Every variant maps `[0, 1]` onto `[0, 1]`, is monotonic and fixes both
/// ends (`ease(0) == 0`, `ease(1) == 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// No shaping, straight line between points
    Identity,
    #[default]
    QuadraticInOut,
    /// Cubic bezier with both control handles flat (smoothstep)
    BezierInOut,
}

impl Easing {
    #[must_use]
    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Identity => t,
            Easing::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::BezierInOut => cubic_bezier(t, 0.0, 1.0),
        }
    }

    /// Interpolate between `start` and `end` with the eased parameter.
    #[must_use]
    #[inline]
    pub fn interpolate(&self, start: f32, end: f32, t: f32) -> f32 {
        start + (end - start) * self.apply(t)
    }

    #[must_use]
    pub fn all() -> &'static [Easing] {
        &[Self::Identity, Self::QuadraticInOut, Self::BezierInOut]
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Identity => "Identity",
            Easing::QuadraticInOut => "Quadratic In-Out",
            Easing::BezierInOut => "Bezier In-Out",
        }
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One-dimensional cubic bezier with fixed 0 -> 1 endpoints.
#[inline]
fn cubic_bezier(t: f32, cp1: f32, cp2: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    // B(t) = 3(1-t)²t·cp1 + 3(1-t)t²·cp2 + t³
    3.0 * mt2 * t * cp1 + 3.0 * mt * t2 * cp2 + t3
}
