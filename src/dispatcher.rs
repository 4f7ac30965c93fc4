use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use derive_ex::derive_ex;
use parse_display::Display;

use crate::{utils::FlagGuard, Action, ListenerId, Listeners, Subscription};


/// Token returned by [`Dispatcher::register`].
pub type DispatchToken = ListenerId;

/// Flux-style dispatch channel.
///
/// [`dispatch`](Self::dispatch) calls every registered listener synchronously, in registration order.
/// Cloning a `Dispatcher` yields another handle to the same channel.
#[derive_ex(Clone, bound())]
pub struct Dispatcher<A: 'static>(Rc<DispatcherNode<A>>);

struct DispatcherNode<A: 'static> {
    listeners: RefCell<Listeners<A>>,
    is_dispatching: Cell<bool>,
}

impl<A: 'static> Dispatcher<A> {
    pub fn new() -> Self {
        Self(Rc::new(DispatcherNode {
            listeners: RefCell::new(Listeners::new()),
            is_dispatching: Cell::new(false),
        }))
    }

    /// Registers a listener that is called for every dispatched action.
    pub fn register(&self, f: impl Fn(&A) + 'static) -> DispatchToken {
        let token = self.0.listeners.borrow_mut().insert(f);
        tracing::trace!(%token, "listener registered");
        token
    }

    /// Registers a listener that is unregistered when the returned [`Subscription`] is dropped.
    pub fn register_scoped(&self, f: impl Fn(&A) + 'static) -> Subscription {
        let token = self.register(f);
        Subscription::from_weak_fn(Rc::downgrade(&self.0), move |node| {
            node.listeners.borrow_mut().remove(token);
        })
    }

    /// Unregisters a listener.
    ///
    /// Returns `false` if the listener is not registered.
    /// A listener unregistered during a dispatch is not called for the rest of that dispatch.
    pub fn unregister(&self, token: DispatchToken) -> bool {
        let removed = self.0.listeners.borrow_mut().remove(token);
        tracing::trace!(%token, removed, "listener unregistered");
        removed
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.0.listeners.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.listeners.borrow().is_empty()
    }

    pub fn is_dispatching(&self) -> bool {
        self.0.is_dispatching.get()
    }

    /// Calls every registered listener with `action`.
    ///
    /// Dispatching from within a listener of the same channel fails with [`DispatchError::Reentrant`].
    /// If a listener panics, the remaining listeners are not called and the channel becomes idle again.
    pub fn dispatch(&self, action: &A) -> Result<(), DispatchError>
    where
        A: Action,
    {
        let Some(_guard) = FlagGuard::try_set(&self.0.is_dispatching) else {
            tracing::warn!(action = action.action_type(), "reentrant dispatch rejected");
            return Err(DispatchError::Reentrant);
        };
        tracing::debug!(action = action.action_type(), listeners = self.len(), "dispatch");
        Listeners::notify(&self.0.listeners, action);
        Ok(())
    }
}

impl<A: 'static> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}
impl<A: 'static> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.len())
            .field("is_dispatching", &self.is_dispatching())
            .finish()
    }
}

/// Error returned when an action cannot be dispatched.
#[non_exhaustive]
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[display("cannot dispatch in the middle of a dispatch")]
    Reentrant,
    #[display("actions must be plain actions, but {0} reached the reducer")]
    NotPlainAction(String),
    #[display("failed to spawn a deferred action: {0}")]
    Spawn(String),
}

impl std::error::Error for DispatchError {}
