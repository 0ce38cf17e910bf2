//! Speed-ramp editor - application context
//!
//! Owns the curve, the edit session, the coordinate mapper and the playback
//! driver, and wires them together for a host event loop.

use glam::Vec2;

use super::config::EditorConfig;
use super::curve::{ControlPoint, SpeedCurve};
use super::mapper::CoordinateMapper;
use super::playback::{PlaybackDriver, PlaybackStatus, TimeSource};
use super::scene::{build_scene, handle_targets, RenderScene, Renderer, SceneParams};
use super::session::{EditOutcome, EditSession, HitTarget, PointerEvent};

/// Everything a single speed-ramp canvas needs.
///
/// The host calls [`Self::handle_pointer`] for input, [`Self::tick`] once per
/// frame and [`Self::render`] after that. Edits are applied synchronously, so
/// a frame always sees a fully applied mutation.
#[derive(Debug, Clone)]
pub struct SpeedRampEditor {
    curve: SpeedCurve,
    session: EditSession,
    mapper: CoordinateMapper,
    driver: PlaybackDriver,
    config: EditorConfig,
    /// Normalized time of the last tick with valid timing
    playhead: Option<f32>,
    last_status: Option<PlaybackStatus>,
}

impl SpeedRampEditor {
    pub fn new(config: EditorConfig, width: f32, height: f32, pixel_density: f32) -> Self {
        let mut mapper = CoordinateMapper::default();
        mapper.resize(width, height, pixel_density);
        Self {
            curve: config.initial_curve(),
            session: EditSession::new(),
            mapper,
            driver: PlaybackDriver::new(config.max_speed),
            config,
            playhead: None,
            last_status: None,
        }
    }

    pub fn curve(&self) -> &SpeedCurve {
        &self.curve
    }

    /// Replace the curve, ending any drag in progress.
    pub fn set_curve(&mut self, curve: SpeedCurve) {
        self.session.pointer_up();
        self.curve = curve;
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn driver(&self) -> &PlaybackDriver {
        &self.driver
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn last_status(&self) -> Option<PlaybackStatus> {
        self.last_status
    }

    /// Reconfigure for a new canvas size. Curve state is size independent.
    pub fn resize(&mut self, width: f32, height: f32, pixel_density: f32) {
        self.mapper.resize(width, height, pixel_density);
        log::info!(
            "Viewport resized to {}x{} @{}",
            self.mapper.width(),
            self.mapper.height(),
            self.mapper.pixel_density()
        );
    }

    /// Handle geometry for the current curve and viewport.
    pub fn hit_targets(&self) -> Vec<HitTarget> {
        handle_targets(&self.curve, &self.mapper, self.config.handle_radius)
    }

    /// Feed one pointer event, hit-testing against the current handles.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EditOutcome {
        let targets = self.hit_targets();
        self.handle_pointer_with(event, &targets)
    }

    /// Feed one pointer event, hit-testing against geometry supplied by an
    /// external renderer.
    pub fn handle_pointer_with(
        &mut self,
        event: PointerEvent,
        targets: &[HitTarget],
    ) -> EditOutcome {
        let outcome = self
            .session
            .handle(event, targets, &mut self.curve, &self.mapper);
        if outcome != EditOutcome::Nothing {
            log::debug!("{:?} -> {:?}", event, outcome);
        }
        outcome
    }

    /// Per-frame playback update. Returns `None` when the rate was left
    /// untouched.
    ///
    /// The playhead follows the source on every tick, including positions in
    /// a trimmed-off region where the rate is not updated.
    pub fn tick<S: TimeSource + ?Sized>(&mut self, source: &mut S) -> Option<PlaybackStatus> {
        let current = source.current_time_ms();
        let duration = source.duration_ms();
        if current.is_finite() && duration.is_finite() && duration > 0.0 {
            self.playhead = Some((current / duration) as f32);
        }

        let status = self.driver.tick(&self.curve, source);
        self.last_status = status;
        status
    }

    pub fn scene(&self) -> RenderScene {
        let params = SceneParams {
            handle_radius: self.config.handle_radius,
            ghost_radius: self.config.ghost_radius,
            curve_samples: self.config.curve_samples_per_segment(),
            playhead: self.playhead,
            ghost: self.session.ghost(),
            cursor: self.session.cursor(),
        };
        build_scene(&self.curve, &self.mapper, &params)
    }

    /// Build the frame's scene and hand it to `renderer`.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) -> RenderScene {
        let scene = self.scene();
        renderer.draw(&scene);
        scene
    }

    /// Convert a canvas position to curve space, e.g. for a readout.
    pub fn to_curve_space(&self, pos: Vec2) -> ControlPoint {
        self.mapper.to_normalized(pos)
    }
}

impl Default for SpeedRampEditor {
    fn default() -> Self {
        let size = CoordinateMapper::default().size();
        Self::new(EditorConfig::default(), size.x, size.y, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::Ticker;
    use crate::session::CursorHint;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_editor() {
        let editor = SpeedRampEditor::default();
        assert_eq!(editor.curve().len(), 4);
        assert_eq!(editor.mapper().size(), Vec2::new(600.0, 280.0));
        assert_eq!(editor.driver().max_speed(), 6.0);
        assert!(editor.last_status().is_none());
    }

    #[test]
    fn test_insert_through_pointer() {
        let mut editor = SpeedRampEditor::new(EditorConfig::default(), 400.0, 200.0, 1.0);
        let outcome = editor.handle_pointer(PointerEvent::Down(Vec2::new(100.0, 50.0)));
        assert!(matches!(outcome, EditOutcome::Inserted(_)));
        assert_eq!(editor.curve().len(), 5);
        assert_eq!(editor.handle_pointer(PointerEvent::Up), EditOutcome::Nothing);
    }

    #[test]
    fn test_resize_keeps_curve() {
        let mut editor = SpeedRampEditor::default();
        let before = editor.curve().clone();
        editor.resize(1200.0, 560.0, 2.0);
        assert_eq!(editor.curve(), &before);
        assert_relative_eq!(editor.hit_targets()[3].center.x, 1200.0);
        assert_eq!(editor.scene().pixel_density, 2.0);
    }

    #[test]
    fn test_tick_updates_playhead() {
        let mut editor = SpeedRampEditor::default();
        let mut ticker = Ticker::new(1000.0);
        ticker.seek(500.0);

        let status = editor.tick(&mut ticker).unwrap();
        assert_relative_eq!(status.normalized_time, 0.5);
        assert_relative_eq!(status.speed, 1.0);
        assert_relative_eq!(editor.scene().playhead_x.unwrap(), 300.0);
    }

    #[test]
    fn test_playhead_moves_through_trimmed_region() {
        let mut editor = SpeedRampEditor::default();
        let first = editor.curve().id_at(0).unwrap();
        let mut curve = editor.curve().clone();
        curve.move_point(first, 0.2, 0.0);
        editor.set_curve(curve);

        let mut ticker = Ticker::new(1000.0);
        ticker.seek(500.0);
        assert!(editor.tick(&mut ticker).is_some());
        assert_relative_eq!(editor.scene().playhead_x.unwrap(), 300.0);

        // Inside the trimmed-off start: no rate update, playhead still moves
        ticker.seek(100.0);
        assert!(editor.tick(&mut ticker).is_none());
        assert!(editor.last_status().is_none());
        assert_relative_eq!(editor.scene().playhead_x.unwrap(), 60.0);
    }

    #[test]
    fn test_oversized_curve_samples_do_not_panic() {
        let config = EditorConfig {
            curve_samples: usize::MAX,
            ..EditorConfig::default()
        };
        let editor = SpeedRampEditor::new(config, 600.0, 280.0, 1.0);
        let scene = editor.scene();
        // Three segments of capped samples plus the closing point
        assert_eq!(
            scene.curve_path.len(),
            3 * (crate::curve::MAX_SAMPLES_PER_SEGMENT + 1) + 1
        );
    }

    #[test]
    fn test_hover_reaches_scene() {
        let mut editor = SpeedRampEditor::default();
        let center = editor.hit_targets()[1].center;
        editor.handle_pointer(PointerEvent::Move(center));
        let scene = editor.scene();
        assert_eq!(scene.cursor, CursorHint::Pointer);
        assert_eq!(scene.ghost, Some(center));
    }

    #[test]
    fn test_set_curve_ends_drag() {
        let mut editor = SpeedRampEditor::default();
        let center = editor.hit_targets()[1].center;
        editor.handle_pointer(PointerEvent::Down(center));
        assert!(editor.session().state().is_dragging());

        editor.set_curve(SpeedCurve::new());
        assert!(!editor.session().state().is_dragging());
        assert_eq!(editor.curve().len(), 2);
    }
}
