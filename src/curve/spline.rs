use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::curve::notify::{ChangeNotifier, Subscription};
use crate::curve::{CurveId, CurvePoint};

/// Polyline resolution used to estimate each curve's length.
const LENGTH_SEGMENTS: usize = 32;

// ============================================================================
// Knots
// ============================================================================

/// A Bézier knot.
///
/// Tangents are offsets from `position` expressed in spline space.
/// `rotation` orients the knot; its +Y axis is the curve's up vector there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierKnot {
    pub position: Vec3,
    pub tangent_in: Vec3,
    pub tangent_out: Vec3,
    pub rotation: Quat,
}

impl BezierKnot {
    /// A knot with collapsed handles.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            tangent_in: Vec3::ZERO,
            tangent_out: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_tangents(position: Vec3, tangent_in: Vec3, tangent_out: Vec3) -> Self {
        Self {
            position,
            tangent_in,
            tangent_out,
            rotation: Quat::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// What changed in a spline. Delivered with every change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineModification {
    KnotInserted(usize),
    KnotRemoved(usize),
    KnotModified(usize),
    ClosedModified,
    Cleared,
}

// ============================================================================
// Spline
// ============================================================================

#[derive(Debug, Default)]
struct SplineData {
    knots: Vec<BezierKnot>,
    closed: bool,
    curve_lengths: Vec<f32>,
    length: f32,
}

impl SplineData {
    fn curve_count(&self) -> usize {
        match self.knots.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    fn control_points(&self, curve: usize) -> [Vec3; 4] {
        let k0 = &self.knots[curve];
        let k1 = &self.knots[(curve + 1) % self.knots.len()];
        [
            k0.position,
            k0.position + k0.tangent_out,
            k1.position + k1.tangent_in,
            k1.position,
        ]
    }

    fn rebuild_lengths(&mut self) {
        self.curve_lengths.clear();
        for curve in 0..self.curve_count() {
            let points = self.control_points(curve);
            let mut previous = points[0];
            let mut length = 0.0;
            for step in 1..=LENGTH_SEGMENTS {
                let u = step as f32 / LENGTH_SEGMENTS as f32;
                let current = bezier_position(&points, u);
                length += current.distance(previous);
                previous = current;
            }
            self.curve_lengths.push(length);
        }
        self.length = self.curve_lengths.iter().sum();
    }

    /// Maps a normalized spline parameter to `(curve index, curve-local u)`.
    ///
    /// Curves receive a share of `[0, 1]` proportional to their length; a
    /// zero-length spline falls back to equal shares.
    fn locate(&self, t: f32) -> (usize, f32) {
        let count = self.curve_count();
        let t = t.clamp(0.0, 1.0);

        if self.length > 0.0 {
            let target = t * self.length;
            let mut start = 0.0;
            for (curve, &length) in self.curve_lengths.iter().enumerate() {
                let end = start + length;
                if target <= end || curve == count - 1 {
                    let u = if length > 0.0 {
                        ((target - start) / length).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    return (curve, u);
                }
                start = end;
            }
        }

        let scaled = t * count as f32;
        let curve = (scaled.floor() as usize).min(count - 1);
        (curve, scaled - curve as f32)
    }

    fn evaluate(&self, t: f32) -> CurvePoint {
        match self.knots.len() {
            0 => return CurvePoint::ORIGIN,
            1 => {
                let knot = &self.knots[0];
                return CurvePoint {
                    position: knot.position,
                    tangent: Vec3::ZERO,
                    up: knot.rotation * Vec3::Y,
                };
            }
            _ => {}
        }

        let (curve, u) = self.locate(t);
        let points = self.control_points(curve);
        let k0 = &self.knots[curve];
        let k1 = &self.knots[(curve + 1) % self.knots.len()];

        CurvePoint {
            position: bezier_position(&points, u),
            tangent: bezier_derivative(&points, u),
            up: k0.rotation.slerp(k1.rotation, u) * Vec3::Y,
        }
    }
}

struct SplineInner {
    id: CurveId,
    data: RefCell<SplineData>,
    version: Cell<u64>,
    changed: ChangeNotifier<SplineModification>,
}

/// Shared handle to a cubic Bézier spline.
///
/// Cloning the handle does not clone the spline; equality is identity.
/// Every edit bumps [`version`](Self::version) and notifies subscribers.
#[derive(Clone)]
pub struct Spline(Rc<SplineInner>);

impl PartialEq for Spline {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for Spline {}
impl std::hash::Hash for Spline {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Spline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.data.borrow();
        f.debug_struct("Spline")
            .field("id", &self.0.id)
            .field("knots", &data.knots.len())
            .field("closed", &data.closed)
            .field("length", &data.length)
            .finish()
    }
}

impl Spline {
    #[must_use]
    pub fn new(knots: Vec<BezierKnot>, closed: bool) -> Self {
        let mut data = SplineData {
            knots,
            closed,
            ..SplineData::default()
        };
        data.rebuild_lengths();

        Self(Rc::new(SplineInner {
            id: CurveId::next(),
            data: RefCell::new(data),
            version: Cell::new(1),
            changed: ChangeNotifier::new(),
        }))
    }

    /// A spline running through `points` with straight, uniformly
    /// parameterized curves between consecutive points.
    #[must_use]
    pub fn linear(points: &[Vec3], closed: bool) -> Self {
        let n = points.len();
        let mut knots: Vec<BezierKnot> = points.iter().map(|&p| BezierKnot::new(p)).collect();

        let curves = match n {
            0 | 1 => 0,
            _ if closed => n,
            _ => n - 1,
        };
        for curve in 0..curves {
            let next = (curve + 1) % n;
            let third = (points[next] - points[curve]) / 3.0;
            knots[curve].tangent_out = third;
            knots[next].tangent_in = -third;
        }

        Self::new(knots, closed)
    }

    // ========================================================================
    // Identity & versioning
    // ========================================================================

    #[must_use]
    pub fn id(&self) -> CurveId {
        self.0.id
    }

    /// Content version, incremented on every edit.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.0.version.get()
    }

    /// Listens for edits of this spline.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&SplineModification) + 'static) -> Subscription {
        self.0.changed.subscribe(listener)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn knot_count(&self) -> usize {
        self.0.data.borrow().knots.len()
    }

    #[must_use]
    pub fn knot(&self, index: usize) -> Option<BezierKnot> {
        self.0.data.borrow().knots.get(index).copied()
    }

    #[must_use]
    pub fn knots(&self) -> Vec<BezierKnot> {
        self.0.data.borrow().knots.clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.data.borrow().closed
    }

    /// Number of Bézier curves (knot pairs) in the spline.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.0.data.borrow().curve_count()
    }

    /// Approximate arc length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.0.data.borrow().length
    }

    /// Evaluates position, tangent and up at normalized parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> CurvePoint {
        self.0.data.borrow().evaluate(t)
    }

    #[must_use]
    pub fn evaluate_position(&self, t: f32) -> Vec3 {
        self.evaluate(t).position
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn set_knot(&self, index: usize, knot: BezierKnot) {
        if index >= self.knot_count() {
            log::warn!("Spline {:?}: knot index {index} out of bounds", self.0.id);
            return;
        }
        self.modify(SplineModification::KnotModified(index), |data| {
            data.knots[index] = knot;
        });
    }

    pub fn push_knot(&self, knot: BezierKnot) {
        let index = self.knot_count();
        self.insert_knot(index, knot);
    }

    pub fn insert_knot(&self, index: usize, knot: BezierKnot) {
        let index = index.min(self.knot_count());
        self.modify(SplineModification::KnotInserted(index), |data| {
            data.knots.insert(index, knot);
        });
    }

    pub fn remove_knot(&self, index: usize) -> Option<BezierKnot> {
        if index >= self.knot_count() {
            return None;
        }
        let mut removed = None;
        self.modify(SplineModification::KnotRemoved(index), |data| {
            removed = Some(data.knots.remove(index));
        });
        removed
    }

    pub fn set_closed(&self, closed: bool) {
        if self.is_closed() == closed {
            return;
        }
        self.modify(SplineModification::ClosedModified, |data| {
            data.closed = closed;
        });
    }

    pub fn clear(&self) {
        self.modify(SplineModification::Cleared, |data| data.knots.clear());
    }

    /// Applies `edit`, refreshes cached lengths, bumps the version and
    /// notifies. The data borrow is released before listeners run.
    fn modify(&self, event: SplineModification, edit: impl FnOnce(&mut SplineData)) {
        {
            let mut data = self.0.data.borrow_mut();
            edit(&mut data);
            data.rebuild_lengths();
        }
        self.0.version.set(self.0.version.get().wrapping_add(1));
        self.0.changed.notify(&event);
    }
}

// ============================================================================
// Bézier helpers
// ============================================================================

fn bezier_position(p: &[Vec3; 4], u: f32) -> Vec3 {
    let v = 1.0 - u;
    p[0] * (v * v * v) + p[1] * (3.0 * v * v * u) + p[2] * (3.0 * v * u * u) + p[3] * (u * u * u)
}

fn bezier_derivative(p: &[Vec3; 4], u: f32) -> Vec3 {
    let v = 1.0 - u;
    (p[1] - p[0]) * (3.0 * v * v) + (p[2] - p[1]) * (6.0 * v * u) + (p[3] - p[2]) * (3.0 * u * u)
}
