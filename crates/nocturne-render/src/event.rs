//! Observer registrations for single-threaded event sources.
//!
//! Settings stores and preference signals both expose a
//! subscribe/unsubscribe pair backed by [`Listeners`]. Registrations return a
//! [`ListenerId`] that the subscriber keeps for teardown.
//!
//! Emission takes the listener list out of its cell before calling into
//! listeners, so a listener may subscribe, unsubscribe, or emit again
//! re-entrantly. A nested emission only reaches listeners that are not
//! already being notified. Unsubscribing a listener that is part of an
//! emission in progress skips it for the rest of that emission and drops it
//! once the emission finishes.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// An ordered list of listeners for events of type `T`.
pub struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Listener<T>)>>,
    /// Ids taken out by emissions in progress, outermost first.
    in_flight: RefCell<Vec<ListenerId>>,
    /// In-flight ids unsubscribed before their emission finished.
    detached: RefCell<Vec<ListenerId>>,
}

impl<T> Listeners<T> {
    /// Creates an empty listener list.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
            in_flight: RefCell::new(Vec::new()),
            detached: RefCell::new(Vec::new()),
        }
    }

    /// Registers a listener, returning its id.
    pub fn subscribe(&self, listener: Listener<T>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if the id is unknown.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let pos = entries.iter().position(|(entry, _)| *entry == id);
            pos.map(|pos| entries.remove(pos))
        };
        if let Some(entry) = removed {
            drop(entry);
            return true;
        }

        let in_flight = self.in_flight.borrow().contains(&id);
        let mut detached = self.detached.borrow_mut();
        if in_flight && !detached.contains(&id) {
            detached.push(id);
            return true;
        }
        false
    }

    /// Calls every listener with `event`, in registration order.
    pub fn emit(&self, event: &T) {
        let mut current = std::mem::take(&mut *self.entries.borrow_mut());
        let mark = {
            let mut in_flight = self.in_flight.borrow_mut();
            let mark = in_flight.len();
            in_flight.extend(current.iter().map(|(id, _)| *id));
            mark
        };

        for (id, listener) in current.iter_mut() {
            if self.detached.borrow().contains(id) {
                continue;
            }
            listener(event);
        }
        self.in_flight.borrow_mut().truncate(mark);

        let (kept, removed): (Vec<_>, Vec<_>) = {
            let mut detached = self.detached.borrow_mut();
            current.into_iter().partition(|(id, _)| {
                match detached.iter().position(|d| d == id) {
                    Some(pos) => {
                        detached.swap_remove(pos);
                        false
                    }
                    None => true,
                }
            })
        };

        {
            let mut entries = self.entries.borrow_mut();
            let added = std::mem::replace(&mut *entries, kept);
            entries.extend(added);
        }
        drop(removed);
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}
