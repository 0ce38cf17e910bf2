//! # speed-ramp
//!
//! Speed-ramp curve editing and playback-rate driving - framework-agnostic.
//!
//! This crate provides:
//! - **Speed curves** - Control points in normalized time, eased segments
//! - **Easing strategies** - Identity, quadratic in-out, bezier in-out
//! - **Edit session** - Pointer state machine for drag / insert / remove
//! - **Playback driver** - Turns the curve into a per-frame playback rate
//! - **Render scene** - Per-frame geometry for any drawing backend
//!
//! ## Quick Start
//!
//! ```rust
//! use speed_ramp::{ControlPoint, PlaybackDriver, SpeedCurve, Ticker};
//!
//! // Flat curve from x = 0 to x = 1
//! let mut curve = SpeedCurve::new();
//!
//! // Raise the middle (negative y is "up", i.e. faster)
//! curve.insert_point(ControlPoint::new(0.5, -0.5));
//!
//! // Drive a looping five second clock
//! let driver = PlaybackDriver::default();
//! let mut clock = Ticker::default();
//! clock.seek(2500.0);
//! let status = driver.tick(&curve, &mut clock).unwrap();
//! assert_eq!(status.speed_label(), "4.00x");
//! ```
//!
//! ## Pointer Editing
//!
//! ```rust
//! use glam::Vec2;
//! use speed_ramp::{EditOutcome, PointerEvent, SpeedRampEditor};
//!
//! let mut editor = SpeedRampEditor::default();
//!
//! // Pressing on empty canvas inserts a point
//! let outcome = editor.handle_pointer(PointerEvent::Down(Vec2::new(450.0, 70.0)));
//! assert!(matches!(outcome, EditOutcome::Inserted(_)));
//! editor.handle_pointer(PointerEvent::Up);
//!
//! // Pressing on a handle grabs it, moving drags it
//! let handle = editor.hit_targets()[1].center;
//! editor.handle_pointer(PointerEvent::Down(handle));
//! editor.handle_pointer(PointerEvent::Move(handle - Vec2::new(0.0, 40.0)));
//! editor.handle_pointer(PointerEvent::Up);
//! assert!(editor.curve().is_valid());
//! ```

pub mod config;
pub mod curve;
pub mod easing;
pub mod editor;
pub mod mapper;
pub mod playback;
pub mod scene;
pub mod session;

pub use config::EditorConfig;
pub use curve::{ControlPoint, PointId, SpeedCurve};
pub use easing::Easing;
pub use editor::SpeedRampEditor;
pub use mapper::CoordinateMapper;
pub use playback::{PlaybackDriver, PlaybackStatus, Ticker, TimeSource};
pub use scene::{RenderScene, Renderer};
pub use session::{CursorHint, EditOutcome, EditSession, EditState, HitTarget, PointerEvent};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::EditorConfig;
    pub use crate::curve::{ControlPoint, PointId, SpeedCurve};
    pub use crate::easing::Easing;
    pub use crate::editor::SpeedRampEditor;
    pub use crate::mapper::CoordinateMapper;
    pub use crate::playback::{PlaybackDriver, PlaybackStatus, Ticker, TimeSource};
    pub use crate::scene::{RenderScene, Renderer};
    pub use crate::session::{EditOutcome, EditSession, HitTarget, PointerEvent};
}
