//! Transform Hierarchy
//!
//! A slotmap-backed node tree with iterative world-matrix propagation.
//!
//! The host drives [`Hierarchy::update_world_matrices`] once per tick before
//! any binder is updated; binders then read world matrices to compute the
//! relative transform between a curve source and the effect it feeds.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: SlotMap<NodeHandle, Node>,
    roots: Vec<NodeHandle>,
}

impl Hierarchy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Creates a root node.
    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        let handle = self.nodes.insert(Node::new(name));
        self.roots.push(handle);
        handle
    }

    /// Creates a node directly under `parent`.
    pub fn create_child(&mut self, name: &str, parent: NodeHandle) -> NodeHandle {
        let handle = self.create_node(name);
        self.attach(handle, parent);
        handle
    }

    /// Re-parents `child` under `parent`.
    ///
    /// Attaching a node to itself or to one of its descendants is ignored.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || self.is_ancestor(child, parent) {
            log::warn!("Cannot attach node {child:?} under itself or its descendant {parent:?}");
            return;
        }
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::error!("Node not found during attach ({child:?} -> {parent:?})");
            return;
        }

        // 1. Detach from the old parent (or the root list)
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.roots.iter().position(|&x| x == child) {
            self.roots.remove(i);
        }

        // 2. Attach to the new one
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(Node::parent);
        }
        false
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World matrix of `handle`, identity for unknown handles.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Affine3A {
        self.nodes
            .get(handle)
            .map_or(Affine3A::IDENTITY, |n| *n.world_matrix())
    }

    /// Matrix mapping points in `from`'s local space into `to`'s local space.
    #[must_use]
    pub fn relative_matrix(&self, from: NodeHandle, to: NodeHandle) -> Affine3A {
        if from == to {
            return Affine3A::IDENTITY;
        }
        self.world_matrix(to).inverse() * self.world_matrix(from)
    }

    // ========================================================================
    // World matrix propagation
    // ========================================================================

    /// Propagates local matrices down the tree.
    ///
    /// Uses an explicit stack instead of recursion. A node's world matrix is
    /// only recomputed when its own TRS or an ancestor changed.
    pub fn update_world_matrices(&mut self) {
        // (node, parent world matrix, parent changed)
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

        for &root in self.roots.iter().rev() {
            stack.push((root, Affine3A::IDENTITY, false));
        }

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };

            let local_changed = node.transform.update_local_matrix();
            let world_needs_update = local_changed || parent_changed;

            if world_needs_update {
                let new_world = parent_world * *node.transform.local_matrix();
                node.transform.set_world_matrix(new_world);
            }

            let current_world = node.transform.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, current_world, world_needs_update));
            }
        }
    }
}
