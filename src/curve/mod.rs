//! Curve Data Sources
//!
//! The geometry a binder can bake from. These types belong to whoever edits
//! the curves; binders only read them and listen for changes.
//!
//! - [`Spline`]: a cubic Bézier spline handle with per-spline change events
//! - [`SplineContainer`]: an ordered set of splines living on a scene node
//! - [`VertexPath`] / [`PathCreator`]: a polyline path evaluated by distance,
//!   owned by a creator that announces whenever it regenerates the path
//!
//! All handles are cheap to clone and compare by identity ([`CurveId`]), not
//! by content.

pub mod container;
pub mod notify;
pub mod spline;
pub mod vertex_path;

pub use container::{ContainerChange, SplineContainer};
pub use notify::{ChangeNotifier, DirtyFlag, Subscription};
pub use spline::{BezierKnot, Spline, SplineModification};
pub use vertex_path::{EndOfPath, PathCreator, PathUpdated, VertexPath};

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

// Global curve id generator, shared by every curve kind
static NEXT_CURVE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a curve object. Two handles with the same id are the same curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveId(u64);

impl CurveId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CURVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Result of evaluating a curve at one parameter value.
///
/// `tangent` is not normalized and may be zero at cusps or at knots whose
/// handles collapse onto the knot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub position: Vec3,
    pub tangent: Vec3,
    pub up: Vec3,
}

impl CurvePoint {
    pub const ORIGIN: Self = Self {
        position: Vec3::ZERO,
        tangent: Vec3::ZERO,
        up: Vec3::Y,
    };
}
