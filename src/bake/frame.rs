//! Frame Builder
//!
//! Turns a curve tangent and up vector into an orientation, and maps samples
//! from the curve owner's local space into the effect's local space.
//!
//! Convention: the orientation's +Z axis is the forward (tangent) direction
//! and +Y is as close to the reference up vector as the tangent allows.

use glam::{Affine3A, Mat3, Quat, Vec3};

use crate::scene::{Hierarchy, NodeHandle};

const PARALLEL_EPSILON: f32 = 1e-12;

/// Rotation whose +Z axis points along `forward`, with +Y towards `up`.
///
/// Falls back to the shortest arc from +Z when `up` is parallel to
/// `forward`, and to identity when `forward` is zero.
#[must_use]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let right = up.cross(forward);
    if right.length_squared() < PARALLEL_EPSILON {
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let right = right.normalize();
    let up = forward.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Source-local → destination-local mapping applied to every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeFrame {
    matrix: Affine3A,
    rotation: Quat,
    identity: bool,
}

impl RelativeFrame {
    pub const IDENTITY: Self = Self {
        matrix: Affine3A::IDENTITY,
        rotation: Quat::IDENTITY,
        identity: true,
    };

    /// Frame mapping `source` node space into `destination` node space.
    ///
    /// Identical nodes produce [`RelativeFrame::IDENTITY`], which makes
    /// [`apply`](Self::apply) a no-op.
    #[must_use]
    pub fn between(hierarchy: &Hierarchy, source: NodeHandle, destination: NodeHandle) -> Self {
        if source == destination {
            return Self::IDENTITY;
        }
        Self::from_matrix(hierarchy.relative_matrix(source, destination))
    }

    #[must_use]
    pub fn from_matrix(matrix: Affine3A) -> Self {
        let (_, rotation, _) = matrix.to_scale_rotation_translation();
        Self {
            matrix,
            rotation: rotation.normalize(),
            identity: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &Affine3A {
        &self.matrix
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Maps a source-local position and orientation into destination space.
    ///
    /// The relative rotation is applied after the look rotation:
    /// `final = relative * orientation`.
    #[inline]
    #[must_use]
    pub fn apply(&self, position: Vec3, orientation: Quat) -> (Vec3, Quat) {
        if self.identity {
            return (position, orientation);
        }
        (
            self.matrix.transform_point3(position),
            (self.rotation * orientation).normalize(),
        )
    }
}

impl Default for RelativeFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}
