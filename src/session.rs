//! Pointer edit state machine
//!
//! Turns a stream of normalized pointer events into curve mutations.
//!
//! | Event  | Over a handle              | Over empty canvas           |
//! |--------|----------------------------|-----------------------------|
//! | Down   | start dragging that point  | insert a point there        |
//! | Move   | drag / hover feedback      | ghost cursor only           |
//! | Up     | stop dragging              | stop dragging               |
//! | Remove | delete the point (not ends)| nothing                     |

use glam::Vec2;

use crate::curve::{PointId, SpeedCurve};
use crate::mapper::CoordinateMapper;

/// Canvas-relative pointer input, already normalized from mouse/touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    /// Double click / double tap / long press
    Remove(Vec2),
}

/// Hit-testable handle geometry for one control point, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTarget {
    pub center: Vec2,
    pub radius: f32,
    pub point: PointId,
}

impl HitTarget {
    #[must_use]
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        self.center.distance_squared(pos) <= self.radius * self.radius
    }
}

/// First target containing `pos`, in iteration order.
#[must_use]
pub fn hit_test(targets: &[HitTarget], pos: Vec2) -> Option<&HitTarget> {
    targets.iter().find(|t| t.contains(pos))
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Dragging {
        target: PointId,
        /// Pointer position minus handle centre at grab time
        grab_offset: Vec2,
    },
}

impl EditState {
    #[must_use]
    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn target(&self) -> Option<PointId> {
        match self {
            Self::Dragging { target, .. } => Some(*target),
            Self::Idle => None,
        }
    }
}

/// Cursor shape the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}

/// What a single pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Nothing,
    Grabbed(PointId),
    Moved(PointId),
    Inserted(PointId),
    Removed(PointId),
    Released(PointId),
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    state: EditState,
    ghost: Option<Vec2>,
    cursor: CursorHint,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Last pointer position, for the cosmetic ghost marker.
    pub fn ghost(&self) -> Option<Vec2> {
        self.ghost
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Dispatch one event to the matching handler.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        targets: &[HitTarget],
        curve: &mut SpeedCurve,
        mapper: &CoordinateMapper,
    ) -> EditOutcome {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos, targets, curve, mapper),
            PointerEvent::Move(pos) => self.pointer_move(pos, targets, curve, mapper),
            PointerEvent::Up => self.pointer_up(),
            PointerEvent::Remove(pos) => self.remove_gesture(pos, targets, curve),
        }
    }

    pub fn pointer_down(
        &mut self,
        pos: Vec2,
        targets: &[HitTarget],
        curve: &mut SpeedCurve,
        mapper: &CoordinateMapper,
    ) -> EditOutcome {
        if let Some(hit) = hit_test(targets, pos) {
            if curve.get(hit.point).is_some() {
                self.state = EditState::Dragging {
                    target: hit.point,
                    grab_offset: pos - hit.center,
                };
                self.cursor = CursorHint::Pointer;
                log::debug!("grabbed point {}", hit.point);
                return EditOutcome::Grabbed(hit.point);
            }
            log::debug!("hit target {} no longer in curve", hit.point);
        }

        self.state = EditState::Idle;
        match curve.insert_point(mapper.to_normalized(pos)) {
            Some(id) => EditOutcome::Inserted(id),
            None => EditOutcome::Nothing,
        }
    }

    pub fn pointer_move(
        &mut self,
        pos: Vec2,
        targets: &[HitTarget],
        curve: &mut SpeedCurve,
        mapper: &CoordinateMapper,
    ) -> EditOutcome {
        self.ghost = Some(pos);

        match self.state {
            EditState::Dragging {
                target,
                grab_offset,
            } => {
                if curve.get(target).is_none() {
                    // Target vanished underneath us
                    self.state = EditState::Idle;
                    self.cursor = CursorHint::Default;
                    return EditOutcome::Nothing;
                }
                let p = mapper.to_normalized(pos - grab_offset);
                if curve.move_point(target, p.x, p.y) {
                    EditOutcome::Moved(target)
                } else {
                    EditOutcome::Nothing
                }
            }
            EditState::Idle => {
                self.cursor = if hit_test(targets, pos).is_some() {
                    CursorHint::Pointer
                } else {
                    CursorHint::Default
                };
                EditOutcome::Nothing
            }
        }
    }

    pub fn pointer_up(&mut self) -> EditOutcome {
        let previous = std::mem::take(&mut self.state);
        match previous.target() {
            Some(target) => {
                log::debug!("released point {}", target);
                EditOutcome::Released(target)
            }
            None => EditOutcome::Nothing,
        }
    }

    pub fn remove_gesture(
        &mut self,
        pos: Vec2,
        targets: &[HitTarget],
        curve: &mut SpeedCurve,
    ) -> EditOutcome {
        let Some(hit) = hit_test(targets, pos) else {
            return EditOutcome::Nothing;
        };
        if curve.remove_point(hit.point).is_none() {
            return EditOutcome::Nothing;
        }

        if self.state.target() == Some(hit.point) {
            self.state = EditState::Idle;
        }
        self.cursor = CursorHint::Default;
        EditOutcome::Removed(hit.point)
    }
}
