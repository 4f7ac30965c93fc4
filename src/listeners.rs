use std::{cell::RefCell, collections::BTreeMap, fmt, ops::Deref, rc::Rc};

use parse_display::Display;

#[cfg(test)]
mod tests;

/// Identifies a registered listener.
///
/// Ids are never reused within one [`Listeners`].
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{0}")]
pub struct ListenerId(u64);

/// Ordered registry of callbacks.
///
/// Callbacks are called in registration order.
pub struct Listeners<T: ?Sized + 'static> {
    items: BTreeMap<ListenerId, Rc<dyn Fn(&T)>>,
    next_id: u64,
}

impl<T: ?Sized + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn insert(&mut self, f: impl Fn(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.items.insert(id, Rc::new(f));
        id
    }

    /// Removes a listener.
    ///
    /// Returns `false` if `id` was already removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.items.remove(&id).is_some()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.items.contains_key(&id)
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(ListenerId, Rc<dyn Fn(&T)>)> {
        self.items
            .iter()
            .map(|(id, f)| (*id, f.clone()))
            .collect()
    }

    /// Calls every listener registered in `cell` with `value`.
    ///
    /// The borrow of `cell` is released while a listener runs, so listeners may register or remove listeners.
    /// A listener removed by an earlier listener is not called.
    /// A listener added during the call is first called by the next `notify`.
    pub fn notify(cell: &RefCell<Self>, value: &T) {
        let snapshot = cell.borrow().snapshot();
        for (id, f) in snapshot {
            if cell.borrow().contains(id) {
                f(value);
            }
        }
    }

    /// Calls every listener registered in `cell` with the value returned by `current` at the time of the call.
    ///
    /// If a listener changes the source of the value, the remaining listeners receive the changed value.
    pub fn notify_latest<V: Deref<Target = T>>(cell: &RefCell<Self>, current: impl Fn() -> V) {
        let snapshot = cell.borrow().snapshot();
        for (id, f) in snapshot {
            if cell.borrow().contains(id) {
                let value = current();
                f(&*value);
            }
        }
    }
}
impl<T: ?Sized + 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T: ?Sized + 'static> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.keys()).finish()
    }
}
