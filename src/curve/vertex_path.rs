use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::bake::frame::look_rotation;
use crate::curve::notify::{ChangeNotifier, Subscription};
use crate::curve::{CurveId, CurvePoint};
use crate::scene::NodeHandle;

/// How distances outside `[0, length]` are mapped back onto the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfPath {
    Loop,
    Reverse,
    #[default]
    Stop,
}

// ============================================================================
// Vertex path
// ============================================================================

#[derive(Debug)]
struct VertexPathInner {
    id: CurveId,
    // For closed paths the first vertex is repeated at the end.
    points: Vec<Vec3>,
    tangents: Vec<Vec3>,
    normals: Vec<Vec3>,
    cumulative: Vec<f32>,
    length: f32,
    closed: bool,
}

/// Immutable polyline path evaluated by travelled distance.
///
/// A path is never edited in place: its [`PathCreator`] builds a new one and
/// announces the swap, so identity changes whenever the geometry does.
#[derive(Clone)]
pub struct VertexPath(Rc<VertexPathInner>);

impl PartialEq for VertexPath {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for VertexPath {}

impl fmt::Debug for VertexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexPath")
            .field("id", &self.0.id)
            .field("vertices", &self.vertex_count())
            .field("length", &self.0.length)
            .field("closed", &self.0.closed)
            .finish()
    }
}

impl VertexPath {
    /// A path through `points` using +Y as the up vector everywhere.
    #[must_use]
    pub fn from_points(points: &[Vec3], closed: bool) -> Self {
        let ups = vec![Vec3::Y; points.len()];
        Self::with_up_vectors(points, &ups, closed)
    }

    /// A path through `points` with one up vector per point.
    ///
    /// Missing up vectors default to +Y.
    #[must_use]
    pub fn with_up_vectors(points: &[Vec3], ups: &[Vec3], closed: bool) -> Self {
        let closed = closed && points.len() > 2;

        let mut vertices = points.to_vec();
        let mut normals: Vec<Vec3> = (0..points.len())
            .map(|i| ups.get(i).copied().unwrap_or(Vec3::Y))
            .collect();
        if closed {
            vertices.push(points[0]);
            normals.push(normals[0]);
        }

        let count = vertices.len();
        let tangents = (0..count)
            .map(|i| {
                let prev = if i > 0 {
                    vertices[i - 1]
                } else if closed {
                    vertices[count - 2]
                } else {
                    vertices[i]
                };
                let next = if i + 1 < count {
                    vertices[i + 1]
                } else if closed {
                    vertices[1]
                } else {
                    vertices[i]
                };
                (next - prev).normalize_or_zero()
            })
            .collect();

        let mut cumulative = Vec::with_capacity(count);
        let mut length = 0.0;
        for (i, vertex) in vertices.iter().enumerate() {
            if i > 0 {
                length += vertex.distance(vertices[i - 1]);
            }
            cumulative.push(length);
        }

        Self(Rc::new(VertexPathInner {
            id: CurveId::next(),
            points: vertices,
            tangents,
            normals,
            cumulative,
            length,
            closed,
        }))
    }

    #[must_use]
    pub fn id(&self) -> CurveId {
        self.0.id
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.0.length
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.closed
    }

    /// Number of distinct vertices (the closing repeat is not counted).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.0.points.len() - usize::from(self.0.closed)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Position, tangent and up at `distance` along the path.
    #[must_use]
    pub fn evaluate_at_distance(&self, distance: f32, end: EndOfPath) -> CurvePoint {
        let inner = &self.0;
        match inner.points.len() {
            0 => return CurvePoint::ORIGIN,
            1 => {
                return CurvePoint {
                    position: inner.points[0],
                    tangent: Vec3::ZERO,
                    up: inner.normals[0],
                };
            }
            _ => {}
        }

        let distance = self.wrap_distance(distance, end);
        let (index, u) = self.segment_at(distance);
        let next = index + 1;

        CurvePoint {
            position: inner.points[index].lerp(inner.points[next], u),
            tangent: inner.tangents[index].lerp(inner.tangents[next], u),
            up: inner.normals[index].lerp(inner.normals[next], u),
        }
    }

    #[must_use]
    pub fn point_at_distance(&self, distance: f32, end: EndOfPath) -> Vec3 {
        self.evaluate_at_distance(distance, end).position
    }

    #[must_use]
    pub fn direction_at_distance(&self, distance: f32, end: EndOfPath) -> Vec3 {
        self.evaluate_at_distance(distance, end)
            .tangent
            .normalize_or_zero()
    }

    /// Orientation looking along the path with the interpolated up vector.
    #[must_use]
    pub fn rotation_at_distance(&self, distance: f32, end: EndOfPath) -> Quat {
        let point = self.evaluate_at_distance(distance, end);
        look_rotation(point.tangent, point.up)
    }

    fn wrap_distance(&self, distance: f32, end: EndOfPath) -> f32 {
        let length = self.0.length;
        if length <= 0.0 {
            return 0.0;
        }
        match end {
            EndOfPath::Stop => distance.clamp(0.0, length),
            EndOfPath::Loop => distance.rem_euclid(length),
            EndOfPath::Reverse => {
                let phase = distance.rem_euclid(2.0 * length);
                if phase > length {
                    2.0 * length - phase
                } else {
                    phase
                }
            }
        }
    }

    /// Segment containing `distance` and the fraction travelled along it.
    fn segment_at(&self, distance: f32) -> (usize, f32) {
        let cumulative = &self.0.cumulative;
        let last_segment = cumulative.len() - 2;

        let next = cumulative.partition_point(|&d| d <= distance);
        let index = next.saturating_sub(1).min(last_segment);

        let start = cumulative[index];
        let span = cumulative[index + 1] - start;
        let u = if span > 1e-6 {
            ((distance - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (index, u)
    }
}

// ============================================================================
// Path creator
// ============================================================================

/// Emitted by a [`PathCreator`] whenever it publishes a new path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathUpdated;

struct PathCreatorInner {
    id: CurveId,
    owner: NodeHandle,
    path: RefCell<Option<VertexPath>>,
    updated: ChangeNotifier<PathUpdated>,
}

/// Owner of a regenerating [`VertexPath`].
#[derive(Clone)]
pub struct PathCreator(Rc<PathCreatorInner>);

impl PartialEq for PathCreator {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for PathCreator {}

impl fmt::Debug for PathCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCreator")
            .field("id", &self.0.id)
            .field("owner", &self.0.owner)
            .field("path", &self.0.path.borrow())
            .finish()
    }
}

impl PathCreator {
    #[must_use]
    pub fn new(owner: NodeHandle) -> Self {
        Self(Rc::new(PathCreatorInner {
            id: CurveId::next(),
            owner,
            path: RefCell::new(None),
            updated: ChangeNotifier::new(),
        }))
    }

    #[must_use]
    pub fn with_path(owner: NodeHandle, path: VertexPath) -> Self {
        let creator = Self::new(owner);
        *creator.0.path.borrow_mut() = Some(path);
        creator
    }

    #[must_use]
    pub fn id(&self) -> CurveId {
        self.0.id
    }

    #[must_use]
    pub fn owner(&self) -> NodeHandle {
        self.0.owner
    }

    #[must_use]
    pub fn path(&self) -> Option<VertexPath> {
        self.0.path.borrow().clone()
    }

    /// Publishes a new path (or removes it) and notifies subscribers.
    pub fn set_path(&self, path: Option<VertexPath>) {
        *self.0.path.borrow_mut() = path;
        self.0.updated.notify(&PathUpdated);
    }

    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&PathUpdated) + 'static) -> Subscription {
        self.0.updated.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_maps_onto_segments() {
        let path = VertexPath::from_points(
            &[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.0)],
            false,
        );
        assert!((path.length() - 3.0).abs() < 1e-6);

        let p = path.point_at_distance(2.0, EndOfPath::Stop);
        assert!((p - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);

        let end = path.point_at_distance(10.0, EndOfPath::Stop);
        assert!((end - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);

        let looped = path.point_at_distance(3.5, EndOfPath::Loop);
        assert!((looped - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);

        let reversed = path.point_at_distance(3.5, EndOfPath::Reverse);
        assert!((reversed - Vec3::new(1.0, 1.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn closed_path_wraps_back_to_start() {
        let square = [
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let path = VertexPath::from_points(&square, true);
        assert_eq!(path.vertex_count(), 4);
        assert!((path.length() - 4.0).abs() < 1e-6);
        assert!(path.point_at_distance(4.0, EndOfPath::Stop).length() < 1e-6);
    }
}
