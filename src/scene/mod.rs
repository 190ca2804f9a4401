//! Scene Module
//!
//! The minimal transform hierarchy curve sources and binders are attached to:
//! - [`Node`]: name, parent/children links and a [`Transform`]
//! - [`Transform`]: TRS with cached matrices and dirty checking
//! - [`Hierarchy`]: node storage and world-matrix propagation

pub mod hierarchy;
pub mod node;
pub mod transform;

pub use hierarchy::Hierarchy;
pub use node::Node;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
