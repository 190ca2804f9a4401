//! Change Notification
//!
//! Curve data sources announce edits through a [`ChangeNotifier`]. Observers
//! receive a [`Subscription`] handle; dropping the handle detaches the
//! listener, so an observer that swaps the curve it watches only has to
//! replace the handle it owns.
//!
//! Delivery is synchronous on the thread performing the edit.
//!
//! ```rust,ignore
//! let flag = DirtyFlag::new();
//! let subscription = spline.subscribe(flag.listener::<SplineModification>());
//! spline.set_closed(true);
//! assert!(flag.take());
//! drop(subscription); // detached
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

type Listener<E> = Rc<dyn Fn(&E)>;

struct ListenerList<E> {
    entries: RefCell<SmallVec<[(u64, Listener<E>); 2]>>,
    next_id: Cell<u64>,
}

trait Detach {
    fn detach(&self, id: u64);
}

impl<E> Detach for ListenerList<E> {
    fn detach(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
    }
}

/// Synchronous, single-threaded event source.
pub struct ChangeNotifier<E> {
    list: Rc<ListenerList<E>>,
}

impl<E: 'static> ChangeNotifier<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: Rc::new(ListenerList {
                entries: RefCell::new(SmallVec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Registers `listener` until the returned handle is dropped.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = self.list.next_id.get();
        self.list.next_id.set(id + 1);
        let listener: Listener<E> = Rc::new(listener);
        self.list.entries.borrow_mut().push((id, listener));

        let list: Rc<dyn Detach> = self.list.clone();
        Subscription {
            list: Rc::downgrade(&list),
            id,
        }
    }

    /// Delivers `event` to every listener registered at the time of the call.
    pub fn notify(&self, event: &E) {
        // Snapshot so listeners may subscribe or drop handles while being called.
        let listeners: SmallVec<[Listener<E>; 2]> = self
            .list
            .entries
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.list.entries.borrow().len()
    }
}

impl<E: 'static> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.list.entries.borrow().len())
            .finish()
    }
}

/// Handle keeping a listener attached to a [`ChangeNotifier`].
///
/// Outliving the notifier is fine; detaching then becomes a no-op.
pub struct Subscription {
    list: Weak<dyn Detach>,
    id: u64,
}

impl Subscription {
    /// Returns `true` while the notifier this handle points to is alive.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.list.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            list.detach(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Shared boolean that any number of notifications can raise.
///
/// This is how the different notification shapes (per spline, per
/// container, per path creator) collapse into one "content changed" signal.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Rc<Cell<bool>>);

impl DirtyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.set(true);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Reads and clears the flag.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    /// A listener closure raising this flag for any event type.
    #[must_use]
    pub fn listener<E: 'static>(&self) -> impl Fn(&E) + 'static {
        let flag = self.clone();
        move |_: &E| flag.raise()
    }
}
