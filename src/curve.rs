//! Speed curve data structures
//!
//! Defines control points and the speed curve that owns them. All logic here
//! works in normalized curve space: `x` is normalized time in `[0, 1]`, `y` is
//! the speed bias in `[-1, 1]`.

use super::easing::Easing;
use serde::{Deserialize, Serialize};

/// Default minimum horizontal distance kept between neighbouring points.
pub const DEFAULT_MIN_POINT_GAP: f32 = 0.001;
/// Upper bound for polyline samples inside one segment.
pub const MAX_SAMPLES_PER_SEGMENT: usize = 1024;

/// Single control point in normalized curve space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Normalized time
    pub x: f32,
    /// Speed bias
    pub y: f32,
}

impl ControlPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for ControlPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Stable identity of a control point within one curve.
///
/// Ids are handed out on insert and never reused, so a held id either names
/// the same point or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u64);

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: PointId,
    point: ControlPoint,
}

/// Time-remapping curve made of eased segments between control points.
///
/// Invariants held after every public call:
/// - at least two points exist
/// - `x` is strictly ascending and every `x` lies in `[0, 1]`
/// - the first and last point cannot be removed
#[derive(Debug, Clone)]
pub struct SpeedCurve {
    entries: Vec<Entry>,
    next_id: u64,
    easing: Easing,
    min_point_gap: f32,
}

impl SpeedCurve {
    /// Create a flat curve with a single segment from `x = 0` to `x = 1`.
    pub fn new() -> Self {
        let mut curve = Self {
            entries: Vec::with_capacity(4),
            next_id: 0,
            easing: Easing::default(),
            min_point_gap: DEFAULT_MIN_POINT_GAP,
        };
        curve.push(ControlPoint::new(0.0, 0.0));
        curve.push(ControlPoint::new(1.0, 0.0));
        curve
    }

    /// Build a curve from explicit points.
    ///
    /// Returns `None` unless the points form a valid curve: at least two
    /// points, finite values, first `x == 0`, last `x == 1` and strictly
    /// ascending `x`. `y` values are clamped to `[-1, 1]`.
    pub fn from_points(points: impl IntoIterator<Item = ControlPoint>) -> Option<Self> {
        let points: Vec<ControlPoint> = points.into_iter().collect();
        if points.len() < 2 || points.iter().any(|p| !p.is_finite()) {
            return None;
        }
        if points[0].x != 0.0 || points[points.len() - 1].x != 1.0 {
            return None;
        }
        if points.windows(2).any(|w| w[0].x >= w[1].x) {
            return None;
        }

        let mut curve = Self {
            entries: Vec::with_capacity(points.len()),
            next_id: 0,
            easing: Easing::default(),
            min_point_gap: DEFAULT_MIN_POINT_GAP,
        };
        for p in points {
            curve.push(ControlPoint::new(p.x, clamp_bias(p.y)));
        }
        Some(curve)
    }

    /// The four-point flat curve a new session starts with.
    pub fn default_flat() -> Self {
        Self::from_points([
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(0.333, 0.0),
            ControlPoint::new(0.667, 0.0),
            ControlPoint::new(1.0, 0.0),
        ])
        .unwrap_or_default()
    }

    /// Set the easing used inside every segment
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the minimum horizontal gap kept between neighbours while dragging
    pub fn with_min_point_gap(mut self, gap: f32) -> Self {
        self.set_min_point_gap(gap);
        self
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    pub fn min_point_gap(&self) -> f32 {
        self.min_point_gap
    }

    pub fn set_min_point_gap(&mut self, gap: f32) {
        if gap.is_finite() && gap > 0.0 {
            self.min_point_gap = gap;
        }
    }

    fn push(&mut self, point: ControlPoint) -> PointId {
        let id = self.allocate_id();
        self.entries.push(Entry { id, point });
        id
    }

    fn allocate_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Get number of points
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if curve has no points
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Points in ascending `x` order
    pub fn points(&self) -> impl ExactSizeIterator<Item = ControlPoint> + '_ {
        self.entries.iter().map(|e| e.point)
    }

    /// Ids and points in ascending `x` order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (PointId, ControlPoint)> + '_ {
        self.entries.iter().map(|e| (e.id, e.point))
    }

    /// Get point at specific index
    pub fn point_at(&self, index: usize) -> Option<ControlPoint> {
        self.entries.get(index).map(|e| e.point)
    }

    /// Get id at specific index
    pub fn id_at(&self, index: usize) -> Option<PointId> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn get(&self, id: PointId) -> Option<ControlPoint> {
        self.index_of(id).map(|i| self.entries[i].point)
    }

    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn first(&self) -> Option<ControlPoint> {
        self.entries.first().map(|e| e.point)
    }

    pub fn last(&self) -> Option<ControlPoint> {
        self.entries.last().map(|e| e.point)
    }

    /// Whether `id` names the first or last point.
    pub fn is_endpoint(&self, id: PointId) -> bool {
        self.entries.first().is_some_and(|e| e.id == id)
            || self.entries.last().is_some_and(|e| e.id == id)
    }

    /// Active playback window `[first.x, last.x]`.
    ///
    /// Narrower than `[0, 1]` once an endpoint has been dragged inward (trim).
    pub fn active_window(&self) -> Option<(f32, f32)> {
        Some((self.first()?.x, self.last()?.x))
    }

    /// Whether either endpoint has been moved off the canvas edge.
    pub fn is_trimmed(&self) -> bool {
        self.active_window()
            .is_some_and(|(start, end)| start > 0.0 || end < 1.0)
    }

    /// Find indices of the points bracketing `t`.
    ///
    /// Returns the last point with `x <= t` paired with the following point.
    /// When `t` sits exactly on a point the same index is returned twice.
    pub fn find_enclosing_segment(&self, t: f32) -> Option<(usize, usize)> {
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        // Number of points with x <= t; points are sorted so this is a split.
        let after = self.entries.partition_point(|e| e.point.x <= t);
        if after == 0 {
            return None;
        }

        let left = after - 1;
        if self.entries[left].point.x == t {
            Some((left, left))
        } else if after < self.entries.len() {
            Some((left, after))
        } else {
            None
        }
    }

    /// Get eased speed bias at normalized time `t`.
    ///
    /// `None` when `t` is outside `[0, 1]` or outside the active window.
    #[inline]
    pub fn evaluate(&self, t: f32) -> Option<f32> {
        let (left, right) = self.find_enclosing_segment(t)?;
        let prev = self.entries[left].point;
        if left == right {
            return Some(prev.y);
        }

        let next = self.entries[right].point;
        let span = next.x - prev.x;
        if span <= 0.0 {
            return Some(prev.y);
        }

        let u = (t - prev.x) / span;
        Some(self.easing.interpolate(prev.y, next.y, u))
    }

    /// Insert a point, keeping `x` ascending.
    ///
    /// Rejected when `x` is outside `(0, 1)`, outside the active window,
    /// already occupied, or the input is not finite. `y` is clamped.
    pub fn insert_point(&mut self, point: ControlPoint) -> Option<PointId> {
        if !point.is_finite() || point.x <= 0.0 || point.x >= 1.0 {
            log::debug!("insert rejected, x out of range: {:?}", point);
            return None;
        }

        let (left, right) = self.find_enclosing_segment(point.x)?;
        if left == right {
            log::debug!("insert rejected, x {} already taken", point.x);
            return None;
        }

        let point = ControlPoint::new(point.x, clamp_bias(point.y));
        let id = self.allocate_id();
        self.entries.insert(right, Entry { id, point });
        log::debug!("inserted point {} at {:?} (index {})", id, point, right);
        Some(id)
    }

    /// Remove a point by id. Endpoints and unknown ids are left alone.
    pub fn remove_point(&mut self, id: PointId) -> Option<ControlPoint> {
        let index = self.index_of(id)?;
        if index == 0 || index + 1 == self.entries.len() {
            log::debug!("remove rejected, {} is an endpoint", id);
            return None;
        }

        let removed = self.entries.remove(index).point;
        log::debug!("removed point {} at {:?}", id, removed);
        Some(removed)
    }

    /// Move a point, clamping it between its neighbours.
    ///
    /// The point never crosses or touches a neighbour: `x` stays at least
    /// `min_point_gap` away from both sides. Endpoints keep `x` within
    /// `[0, 1]`; moving them inward trims the active window. Returns `false`
    /// for unknown ids and non-finite input.
    pub fn move_point(&mut self, id: PointId, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };

        let gap = self.min_point_gap;
        let lower = match index.checked_sub(1) {
            Some(i) => self.entries[i].point.x + gap,
            None => 0.0,
        };
        let upper = match self.entries.get(index + 1) {
            Some(e) => e.point.x - gap,
            None => 1.0,
        };

        let entry = &mut self.entries[index];
        // Neighbours squeezed closer than the gap: only y can change.
        if lower <= upper {
            entry.point.x = x.clamp(lower.max(0.0), upper.min(1.0));
        }
        entry.point.y = clamp_bias(y);
        log::debug!("moved point {} to {:?}", id, entry.point);
        true
    }

    /// Check the ordering and endpoint invariants.
    pub fn is_valid(&self) -> bool {
        self.entries.len() >= 2
            && self.entries.iter().all(|e| {
                e.point.is_finite() && (0.0..=1.0).contains(&e.point.x)
            })
            && self.entries.windows(2).all(|w| w[0].point.x < w[1].point.x)
    }

    /// Sample the eased curve across the active window.
    ///
    /// Always includes every control point, plus `per_segment` evenly spaced
    /// samples inside each segment. `per_segment` is capped at
    /// [`MAX_SAMPLES_PER_SEGMENT`].
    pub fn sample(&self, per_segment: usize) -> Vec<ControlPoint> {
        let per_segment = per_segment.min(MAX_SAMPLES_PER_SEGMENT);
        let mut out = Vec::with_capacity(self.entries.len().saturating_mul(per_segment + 1));
        for pair in self.entries.windows(2) {
            let (prev, next) = (pair[0].point, pair[1].point);
            out.push(prev);
            for i in 1..=per_segment {
                let u = i as f32 / (per_segment + 1) as f32;
                let x = prev.x + (next.x - prev.x) * u;
                let y = self.easing.interpolate(prev.y, next.y, u);
                out.push(ControlPoint::new(x, y));
            }
        }
        if let Some(last) = self.last() {
            out.push(last);
        }
        out
    }
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self::new()
    }
}

/// Two curves are equal when they hold the same points in the same order.
impl PartialEq for SpeedCurve {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.id == b.id && a.point == b.point)
    }
}

fn clamp_bias(y: f32) -> f32 {
    y.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(points: &[(f32, f32)]) -> SpeedCurve {
        SpeedCurve::from_points(points.iter().copied().map(ControlPoint::from))
            .expect("valid test curve")
    }

    #[test]
    fn test_new_curve_is_valid() {
        let c = SpeedCurve::new();
        assert_eq!(c.len(), 2);
        assert!(c.is_valid());
        assert!(!c.is_trimmed());

        let flat = SpeedCurve::default_flat();
        assert_eq!(flat.len(), 4);
        assert_eq!(flat.point_at(1), Some(ControlPoint::new(0.333, 0.0)));
    }

    #[test]
    fn test_from_points_rejects_malformed() {
        assert!(SpeedCurve::from_points([ControlPoint::new(0.0, 0.0)]).is_none());
        assert!(SpeedCurve::from_points([
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(0.5, 0.0),
            ControlPoint::new(0.5, 0.1),
            ControlPoint::new(1.0, 0.0),
        ])
        .is_none());
        assert!(SpeedCurve::from_points([
            ControlPoint::new(0.1, 0.0),
            ControlPoint::new(1.0, 0.0),
        ])
        .is_none());
        assert!(SpeedCurve::from_points([
            ControlPoint::new(0.0, f32::NAN),
            ControlPoint::new(1.0, 0.0),
        ])
        .is_none());
    }

    #[test]
    fn test_evaluate_endpoints_exact() {
        let c = curve(&[(0.0, -0.3), (0.4, 0.9), (1.0, 0.7)]);
        assert_eq!(c.evaluate(0.0), Some(-0.3));
        assert_eq!(c.evaluate(1.0), Some(0.7));
        // Exactly on an inner point
        assert_eq!(c.evaluate(0.4), Some(0.9));
    }

    #[test]
    fn test_evaluate_defined_across_domain() {
        let c = curve(&[(0.0, 0.0), (0.2, 0.5), (0.7, -0.5), (1.0, 0.0)]);
        for i in 0..=1000 {
            let t = i as f32 / 1000.0;
            let y = c.evaluate(t);
            assert!(y.is_some_and(f32::is_finite), "undefined at {t}");
        }
    }

    #[test]
    fn test_evaluate_out_of_domain() {
        let c = SpeedCurve::new();
        assert_eq!(c.evaluate(-0.01), None);
        assert_eq!(c.evaluate(1.01), None);
        assert_eq!(c.evaluate(f32::NAN), None);
    }

    #[test]
    fn test_evaluate_flat_curve() {
        let c = curve(&[(0.0, 0.0), (0.333, 0.0), (0.667, 0.0), (1.0, 0.0)]);
        for easing in Easing::all() {
            assert_eq!(c.clone().with_easing(*easing).evaluate(0.5), Some(0.0));
        }
    }

    #[test]
    fn test_evaluate_single_segment() {
        let c = curve(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_relative_eq!(c.evaluate(0.5).unwrap(), 0.5);

        let linear = c.with_easing(Easing::Identity);
        assert_relative_eq!(linear.evaluate(0.25).unwrap(), 0.25);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let c = curve(&[(0.0, 0.1), (0.6, -0.8), (1.0, 0.4)]);
        assert_eq!(c.evaluate(0.37), c.evaluate(0.37));
    }

    #[test]
    fn test_find_enclosing_segment() {
        let c = curve(&[(0.0, 0.0), (0.25, 0.0), (0.75, 0.0), (1.0, 0.0)]);
        assert_eq!(c.find_enclosing_segment(0.1), Some((0, 1)));
        assert_eq!(c.find_enclosing_segment(0.5), Some((1, 2)));
        assert_eq!(c.find_enclosing_segment(0.25), Some((1, 1)));
        assert_eq!(c.find_enclosing_segment(1.0), Some((3, 3)));
        assert_eq!(c.find_enclosing_segment(0.0), Some((0, 0)));
        assert_eq!(c.find_enclosing_segment(1.5), None);

        for i in 0..=100 {
            let (l, r) = c.find_enclosing_segment(i as f32 / 100.0).unwrap();
            assert!(c.point_at(l).unwrap().x <= c.point_at(r).unwrap().x);
        }
    }

    #[test]
    fn test_insert_maintains_order() {
        let mut c = SpeedCurve::new();
        c.insert_point(ControlPoint::new(0.6, 0.2)).unwrap();
        c.insert_point(ControlPoint::new(0.3, -0.2)).unwrap();
        c.insert_point(ControlPoint::new(0.9, 0.0)).unwrap();

        let xs: Vec<f32> = c.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.3, 0.6, 0.9, 1.0]);
        assert!(c.is_valid());
    }

    #[test]
    fn test_insert_rejects_invalid() {
        let mut c = curve(&[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0)]);
        assert_eq!(c.insert_point(ControlPoint::new(0.5, 0.3)), None);
        assert_eq!(c.insert_point(ControlPoint::new(0.0, 0.3)), None);
        assert_eq!(c.insert_point(ControlPoint::new(1.0, 0.3)), None);
        assert_eq!(c.insert_point(ControlPoint::new(-0.2, 0.3)), None);
        assert_eq!(c.insert_point(ControlPoint::new(f32::NAN, 0.3)), None);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_insert_clamps_bias() {
        let mut c = SpeedCurve::new();
        let id = c.insert_point(ControlPoint::new(0.5, 3.0)).unwrap();
        assert_eq!(c.get(id), Some(ControlPoint::new(0.5, 1.0)));
    }

    #[test]
    fn test_insert_then_remove_round_trip() {
        let original = SpeedCurve::default_flat();
        let mut c = original.clone();
        let id = c.insert_point(ControlPoint::new(0.5, 0.0)).unwrap();
        assert_eq!(c.len(), 5);
        assert_eq!(c.remove_point(id), Some(ControlPoint::new(0.5, 0.0)));
        assert_eq!(c, original);
    }

    #[test]
    fn test_remove_endpoints_rejected() {
        let mut c = SpeedCurve::default_flat();
        let first = c.id_at(0).unwrap();
        let last = c.id_at(3).unwrap();
        assert!(c.is_endpoint(first));
        assert_eq!(c.remove_point(first), None);
        assert_eq!(c.remove_point(last), None);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn test_removed_id_is_stale() {
        let mut c = SpeedCurve::default_flat();
        let inner = c.id_at(1).unwrap();
        c.remove_point(inner).unwrap();
        assert_eq!(c.remove_point(inner), None);
        assert!(!c.move_point(inner, 0.5, 0.0));
        assert_eq!(c.get(inner), None);
    }

    #[test]
    fn test_move_clamps_between_neighbours() {
        let mut c = curve(&[(0.0, 0.0), (0.3, 0.0), (0.6, 0.0), (1.0, 0.0)]);
        let id = c.id_at(1).unwrap();

        assert!(c.move_point(id, 0.9, 0.5));
        let p = c.get(id).unwrap();
        assert_relative_eq!(p.x, 0.6 - DEFAULT_MIN_POINT_GAP);
        assert_eq!(p.y, 0.5);
        assert_eq!(c.index_of(id), Some(1));

        assert!(c.move_point(id, -1.0, -4.0));
        let p = c.get(id).unwrap();
        assert_relative_eq!(p.x, DEFAULT_MIN_POINT_GAP);
        assert_eq!(p.y, -1.0);
        assert!(c.is_valid());
    }

    #[test]
    fn test_move_endpoint_trims() {
        let mut c = SpeedCurve::default_flat();
        let first = c.id_at(0).unwrap();
        let last = c.id_at(3).unwrap();

        c.move_point(first, 0.2, 0.0);
        c.move_point(last, 1.7, 0.0);
        assert_eq!(c.active_window(), Some((0.2, 1.0)));

        c.move_point(last, 0.8, 0.0);
        assert_eq!(c.active_window(), Some((0.2, 0.8)));
        assert!(c.is_trimmed());

        c.move_point(first, -5.0, 0.0);
        assert_eq!(c.first().unwrap().x, 0.0);

        // Outside the window nothing is defined and nothing can be inserted
        c.move_point(first, 0.2, 0.0);
        assert_eq!(c.evaluate(0.1), None);
        assert_eq!(c.evaluate(0.9), None);
        assert_eq!(c.insert_point(ControlPoint::new(0.1, 0.0)), None);
    }

    #[test]
    fn test_move_rejects_non_finite() {
        let mut c = SpeedCurve::default_flat();
        let id = c.id_at(1).unwrap();
        assert!(!c.move_point(id, f32::NAN, 0.0));
        assert!(!c.move_point(id, 0.4, f32::INFINITY));
        assert_eq!(c.get(id), Some(ControlPoint::new(0.333, 0.0)));
    }

    #[test]
    fn test_mutation_sequence_keeps_order() {
        let mut c = SpeedCurve::default_flat();
        let mut ids = Vec::new();
        for i in 1..20 {
            let x = (i as f32 * 0.37) % 1.0;
            if let Some(id) = c.insert_point(ControlPoint::new(x, 0.1)) {
                ids.push(id);
            }
        }
        for (n, id) in ids.iter().enumerate() {
            let target = if n % 2 == 0 { 0.0 } else { 1.0 };
            c.move_point(*id, target, 0.3);
            assert!(c.is_valid());
        }
        for id in ids.iter().step_by(3) {
            c.remove_point(*id);
            assert!(c.is_valid());
        }
    }

    #[test]
    fn test_sample() {
        let c = curve(&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        let samples = c.sample(3);
        assert_eq!(samples.len(), 2 * 4 + 1);
        assert_eq!(samples[0], ControlPoint::new(0.0, 0.0));
        assert_eq!(samples[4], ControlPoint::new(0.5, 1.0));
        assert_eq!(samples[8], ControlPoint::new(1.0, 0.0));
        assert!(samples.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn test_sample_count_capped() {
        let c = SpeedCurve::new();
        let samples = c.sample(usize::MAX);
        assert_eq!(samples.len(), MAX_SAMPLES_PER_SEGMENT + 2);
        assert_eq!(samples.last(), Some(&ControlPoint::new(1.0, 0.0)));
    }
}
