use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::curve::notify::{ChangeNotifier, Subscription};
use crate::curve::spline::Spline;
use crate::curve::CurveId;
use crate::scene::NodeHandle;

/// Container-level edits. Edits inside a spline are reported by the spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerChange {
    SplineAdded(usize),
    SplineRemoved(usize),
    SplineReplaced(usize),
}

struct ContainerInner {
    id: CurveId,
    owner: NodeHandle,
    splines: RefCell<Vec<Spline>>,
    changed: ChangeNotifier<ContainerChange>,
}

/// Ordered collection of splines living on a scene node.
///
/// Spline positions are expressed in the owner node's local space.
#[derive(Clone)]
pub struct SplineContainer(Rc<ContainerInner>);

impl PartialEq for SplineContainer {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for SplineContainer {}

impl fmt::Debug for SplineContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplineContainer")
            .field("id", &self.0.id)
            .field("owner", &self.0.owner)
            .field("splines", &self.0.splines.borrow())
            .finish()
    }
}

impl SplineContainer {
    #[must_use]
    pub fn new(owner: NodeHandle) -> Self {
        Self::with_splines(owner, Vec::new())
    }

    #[must_use]
    pub fn with_splines(owner: NodeHandle, splines: Vec<Spline>) -> Self {
        Self(Rc::new(ContainerInner {
            id: CurveId::next(),
            owner,
            splines: RefCell::new(splines),
            changed: ChangeNotifier::new(),
        }))
    }

    #[must_use]
    pub fn id(&self) -> CurveId {
        self.0.id
    }

    /// The node whose transform the splines are expressed in.
    #[must_use]
    pub fn owner(&self) -> NodeHandle {
        self.0.owner
    }

    /// Listens for splines being added, removed or replaced.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&ContainerChange) + 'static) -> Subscription {
        self.0.changed.subscribe(listener)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The first spline, if any.
    #[must_use]
    pub fn spline(&self) -> Option<Spline> {
        self.0.splines.borrow().first().cloned()
    }

    /// Snapshot of the spline handles in order.
    #[must_use]
    pub fn splines(&self) -> Vec<Spline> {
        self.0.splines.borrow().clone()
    }

    /// Runs `f` on the spline handles without cloning them.
    ///
    /// The container must not be edited from inside `f`.
    pub fn read_splines<R>(&self, f: impl FnOnce(&[Spline]) -> R) -> R {
        f(&self.0.splines.borrow())
    }

    #[must_use]
    pub fn spline_count(&self) -> usize {
        self.0.splines.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spline_count() == 0
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Appends a spline and returns its index.
    pub fn add_spline(&self, spline: Spline) -> usize {
        let index = {
            let mut splines = self.0.splines.borrow_mut();
            splines.push(spline);
            splines.len() - 1
        };
        self.0.changed.notify(&ContainerChange::SplineAdded(index));
        index
    }

    pub fn remove_spline(&self, index: usize) -> Option<Spline> {
        let removed = {
            let mut splines = self.0.splines.borrow_mut();
            (index < splines.len()).then(|| splines.remove(index))
        };
        if removed.is_some() {
            self.0.changed.notify(&ContainerChange::SplineRemoved(index));
        }
        removed
    }

    /// Replaces the spline at `index`, returning the previous one.
    pub fn replace_spline(&self, index: usize, spline: Spline) -> Option<Spline> {
        let previous = {
            let mut splines = self.0.splines.borrow_mut();
            splines
                .get_mut(index)
                .map(|slot| std::mem::replace(slot, spline))
        };
        if previous.is_some() {
            self.0.changed.notify(&ContainerChange::SplineReplaced(index));
        }
        previous
    }
}
