//! Bake Pipeline
//!
//! Everything between a curve source and a host's texel maps:
//!
//! - [`source`]: adapters normalizing spline, spline chain and vertex path
//! - [`sampler`]: evenly spaced samples with degenerate-tangent repair
//! - [`frame`]: look rotations and the source → effect relative transform
//! - [`bounds`]: axis-aligned bounds over baked positions
//! - [`texels`]: half-float RGBA texel maps in a square power-of-two grid
//! - [`tracker`]: dirty tracking that suppresses redundant bakes
//! - [`binder`]: [`PathBinder`], which drives all of the above per tick

pub mod binder;
pub mod bounds;
pub mod frame;
pub mod sampler;
pub mod source;
pub mod texels;
pub mod tracker;

pub use binder::{
    BindOutcome, PathBinder, SplineChainPathBinder, SplinePathBinder, VertexPathBinder,
};
pub use bounds::{Bounds, BoundsAccumulator};
pub use frame::{RelativeFrame, look_rotation};
pub use sampler::{Sample, Sampler, parameter_at};
pub use source::{CurveSource, PathSource, SourceIdentity, SplineChainSource, SplineSource};
pub use texels::{FilterMode, PathBuffers, Texel, TexelBuffer, TextureFormat, side_length};
pub use tracker::{ChangeTracker, DirtyReasons};
