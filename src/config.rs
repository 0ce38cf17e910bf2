//! Runtime configuration for the speed-ramp editor.
//!
//! `EditorConfig` holds every tunable value. The `const` values below are the
//! defaults used when a field is missing from the TOML file.

use serde::{Deserialize, Serialize};

use crate::curve::{ControlPoint, SpeedCurve, DEFAULT_MIN_POINT_GAP, MAX_SAMPLES_PER_SEGMENT};
use crate::easing::Easing;
use crate::playback::DEFAULT_MAX_SPEED;

/// Handle radius in pixels.
pub const HANDLE_RADIUS_PX: f32 = 11.0;
/// Ghost marker radius in pixels.
pub const GHOST_RADIUS_PX: f32 = 10.0;
/// Polyline samples between two control points.
pub const CURVE_SAMPLES_PER_SEGMENT: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Speed multiplier at full curve deflection
    pub max_speed: f32,
    pub easing: Easing,
    pub handle_radius: f32,
    pub ghost_radius: f32,
    /// Minimum normalized distance between neighbouring points while dragging
    pub min_point_gap: f32,
    pub curve_samples: usize,
    /// Curve a fresh session starts with
    pub initial_points: Vec<ControlPoint>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            easing: Easing::default(),
            handle_radius: HANDLE_RADIUS_PX,
            ghost_radius: GHOST_RADIUS_PX,
            min_point_gap: DEFAULT_MIN_POINT_GAP,
            curve_samples: CURVE_SAMPLES_PER_SEGMENT,
            initial_points: SpeedCurve::default_flat().points().collect(),
        }
    }
}

impl EditorConfig {
    /// Parse from TOML text. Missing fields take their defaults,
    /// out-of-range sample counts are clamped.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        let samples = config.curve_samples_per_segment();
        if samples != config.curve_samples {
            log::warn!(
                "curve_samples {} out of range, using {}",
                config.curve_samples,
                samples
            );
            config.curve_samples = samples;
        }
        Ok(config)
    }

    /// `curve_samples` clamped to `1..=MAX_SAMPLES_PER_SEGMENT`.
    pub fn curve_samples_per_segment(&self) -> usize {
        self.curve_samples.clamp(1, MAX_SAMPLES_PER_SEGMENT)
    }

    /// Load from a TOML file. On any error: defaults.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    log::info!("Config loaded from: {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Config file malformed, using defaults: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save as a TOML file.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Build the starting curve, falling back to the flat default when
    /// `initial_points` does not describe a valid curve.
    pub fn initial_curve(&self) -> SpeedCurve {
        let curve = match SpeedCurve::from_points(self.initial_points.iter().copied()) {
            Some(curve) => curve,
            None => {
                log::warn!("Invalid initial_points in config, using flat curve");
                SpeedCurve::default_flat()
            }
        };
        curve
            .with_easing(self.easing)
            .with_min_point_gap(self.min_point_gap)
    }
}
