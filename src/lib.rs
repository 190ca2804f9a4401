#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Bakes curves into position and rotation texel maps for GPU particle
//! effects.
//!
//! A [`PathBinder`] samples a spline, a chain of splines or a vertex path at
//! a fixed number of evenly spaced points, orients each sample along the
//! curve and packs the results into two half-float RGBA maps. Bakes happen
//! only when the curve, the settings or the transform relationship change.

pub mod bake;
pub mod curve;
pub mod errors;
pub mod host;
pub mod scene;
pub mod settings;

pub use bake::{
    BindOutcome, Bounds, CurveSource, PathBinder, PathSource, SplineChainPathBinder,
    SplineChainSource, SplinePathBinder, SplineSource, Texel, TexelBuffer, VertexPathBinder,
};
pub use curve::{BezierKnot, PathCreator, Spline, SplineContainer, VertexPath};
pub use errors::{BakeError, Result};
pub use host::{EffectHost, PropertyKind, PropertySheet};
pub use scene::{Hierarchy, Node, NodeHandle, Transform};
pub use settings::{BinderSettings, BindingNames};
