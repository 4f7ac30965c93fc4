use std::{
    cell::{Cell, RefCell},
    fmt,
    future::Future,
    rc::Rc,
};

use derive_ex::derive_ex;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::{utils::FlagGuard, DispatchError, Listeners, Reducer, Subscription};


/// Redux-style state container.
///
/// The state is replaced with a new snapshot computed by the reducer for each dispatched action,
/// then the subscribers are notified in subscription order.
/// Cloning a `Store` yields another handle to the same container.
#[derive_ex(Clone, bound())]
pub struct Store<S: 'static, A: 'static>(Rc<StoreNode<S, A>>);

struct StoreNode<S: 'static, A: 'static> {
    state: RefCell<Rc<S>>,
    reducer: Box<dyn Reducer<S, A>>,
    middlewares: Vec<Box<dyn Middleware<S, A>>>,
    subscribers: RefCell<Listeners<S>>,
    is_reducing: Cell<bool>,
}

impl<S: 'static, A: 'static> Store<S, A> {
    /// Creates a store without middleware.
    pub fn new(reducer: impl Reducer<S, A>, initial: S) -> Self {
        Self::builder(reducer, initial).build()
    }

    /// Creates a store with the given middleware chain.
    pub fn with_middleware(
        reducer: impl Reducer<S, A>,
        initial: S,
        middlewares: Vec<Box<dyn Middleware<S, A>>>,
    ) -> Self {
        let mut b = Self::builder(reducer, initial);
        b.middlewares = middlewares;
        b.build()
    }

    pub fn builder(reducer: impl Reducer<S, A>, initial: S) -> StoreBuilder<S, A> {
        StoreBuilder {
            reducer: Box::new(reducer),
            initial,
            middlewares: Vec::new(),
        }
    }

    /// Returns the current state snapshot.
    pub fn get_state(&self) -> Rc<S> {
        self.0.state.borrow().clone()
    }

    /// Sends `input` through the middleware chain and then to the reducer.
    pub fn dispatch(&self, input: impl Into<Dispatch<S, A>>) -> Result<(), DispatchError> {
        let api = self.api();
        Next {
            api: &api,
            rest: &self.0.middlewares,
        }
        .run(input.into())
    }

    /// Registers a listener called with the new state after each reduced action.
    ///
    /// A subscriber may dispatch. Subscribers called after it then receive the state produced by that dispatch.
    pub fn subscribe(&self, f: impl Fn(&S) + 'static) -> Subscription {
        let id = self.0.subscribers.borrow_mut().insert(f);
        Subscription::from_weak_fn(Rc::downgrade(&self.0), move |node| {
            node.subscribers.borrow_mut().remove(id);
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.borrow().len()
    }

    /// Returns the handle passed to middleware.
    pub fn api(&self) -> StoreApi<S, A> {
        StoreApi(self.clone())
    }

    fn reduce(&self, action: A) -> Result<(), DispatchError> {
        let node = &self.0;
        let next = {
            let Some(_guard) = FlagGuard::try_set(&node.is_reducing) else {
                return Err(DispatchError::Reentrant);
            };
            let prev = node.state.borrow().clone();
            Rc::new(node.reducer.reduce(&prev, &action))
        };
        *node.state.borrow_mut() = next;
        tracing::trace!(subscribers = self.subscriber_count(), "state replaced");
        Listeners::notify_latest(&node.subscribers, || self.get_state());
        Ok(())
    }
}
impl<S: fmt::Debug + 'static, A: 'static> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("middlewares", &self.0.middlewares.len())
            .finish()
    }
}

/// Builder for a [`Store`] with middleware.
pub struct StoreBuilder<S: 'static, A: 'static> {
    reducer: Box<dyn Reducer<S, A>>,
    initial: S,
    middlewares: Vec<Box<dyn Middleware<S, A>>>,
}

impl<S: 'static, A: 'static> StoreBuilder<S, A> {
    /// Appends a middleware.
    ///
    /// Middleware added first sees a dispatched value first.
    pub fn middleware(mut self, middleware: impl Middleware<S, A>) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }
    /// Appends a middleware implemented by a function.
    pub fn middleware_fn(
        self,
        f: impl Fn(&StoreApi<S, A>, Dispatch<S, A>, Next<'_, S, A>) -> Result<(), DispatchError>
            + 'static,
    ) -> Self {
        self.middleware(middleware_fn(f))
    }
    pub fn build(self) -> Store<S, A> {
        Store(Rc::new(StoreNode {
            state: RefCell::new(Rc::new(self.initial)),
            reducer: self.reducer,
            middlewares: self.middlewares,
            subscribers: RefCell::new(Listeners::new()),
            is_reducing: Cell::new(false),
        }))
    }
}

/// The store as seen by middleware and thunks.
///
/// [`dispatch`](Self::dispatch) starts again from the first middleware.
#[derive_ex(Clone, bound())]
pub struct StoreApi<S: 'static, A: 'static>(Store<S, A>);

impl<S: 'static, A: 'static> StoreApi<S, A> {
    pub fn get_state(&self) -> Rc<S> {
        self.0.get_state()
    }
    pub fn dispatch(&self, input: impl Into<Dispatch<S, A>>) -> Result<(), DispatchError> {
        self.0.dispatch(input)
    }
}

/// A value sent to [`Store::dispatch`].
///
/// Only [`Dispatch::Action`] can be reduced.
/// Other variants must be handled by a middleware such as [`ThunkMiddleware`](crate::ThunkMiddleware)
/// or [`PromiseMiddleware`](crate::PromiseMiddleware).
pub enum Dispatch<S: 'static, A: 'static> {
    Action(A),
    Thunk(Box<dyn FnOnce(&StoreApi<S, A>)>),
    Future {
        kind: String,
        future: LocalBoxFuture<'static, Result<Value, Value>>,
    },
}

impl<S: 'static, A: 'static> Dispatch<S, A> {
    pub fn thunk(f: impl FnOnce(&StoreApi<S, A>) + 'static) -> Self {
        Dispatch::Thunk(Box::new(f))
    }
    pub fn future(
        kind: impl Into<String>,
        future: impl Future<Output = Result<Value, Value>> + 'static,
    ) -> Self {
        Dispatch::Future {
            kind: kind.into(),
            future: future.boxed_local(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Dispatch::Action(_) => "an action".to_string(),
            Dispatch::Thunk(_) => "a thunk".to_string(),
            Dispatch::Future { kind, .. } => format!("a future `{kind}`"),
        }
    }
}
impl<S: 'static, A: 'static> From<A> for Dispatch<S, A> {
    fn from(action: A) -> Self {
        Dispatch::Action(action)
    }
}
impl<S: 'static, A: fmt::Debug + 'static> fmt::Debug for Dispatch<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Dispatch::Thunk(_) => write!(f, "Thunk"),
            Dispatch::Future { kind, .. } => f.debug_struct("Future").field("kind", kind).finish(),
        }
    }
}

/// A wrapper around the dispatch step of a [`Store`].
pub trait Middleware<S: 'static, A: 'static>: 'static {
    /// Handles `input`, typically by calling `next.run` with it or with a replacement.
    ///
    /// Not calling `next.run` stops the value here.
    fn handle(
        &self,
        api: &StoreApi<S, A>,
        input: Dispatch<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<(), DispatchError>;
}

/// Creates a middleware from a function.
pub fn middleware_fn<S: 'static, A: 'static>(
    f: impl Fn(&StoreApi<S, A>, Dispatch<S, A>, Next<'_, S, A>) -> Result<(), DispatchError> + 'static,
) -> impl Middleware<S, A> {
    struct FnMiddleware<F>(F);
    impl<S: 'static, A: 'static, F> Middleware<S, A> for FnMiddleware<F>
    where
        F: Fn(&StoreApi<S, A>, Dispatch<S, A>, Next<'_, S, A>) -> Result<(), DispatchError>
            + 'static,
    {
        fn handle(
            &self,
            api: &StoreApi<S, A>,
            input: Dispatch<S, A>,
            next: Next<'_, S, A>,
        ) -> Result<(), DispatchError> {
            (self.0)(api, input, next)
        }
    }
    FnMiddleware(f)
}

/// The rest of the middleware chain.
pub struct Next<'a, S: 'static, A: 'static> {
    api: &'a StoreApi<S, A>,
    rest: &'a [Box<dyn Middleware<S, A>>],
}

impl<S: 'static, A: 'static> Next<'_, S, A> {
    /// Passes `input` to the next middleware, or to the reducer at the end of the chain.
    pub fn run(self, input: Dispatch<S, A>) -> Result<(), DispatchError> {
        match self.rest.split_first() {
            Some((middleware, rest)) => middleware.handle(
                self.api,
                input,
                Next {
                    api: self.api,
                    rest,
                },
            ),
            None => match input {
                Dispatch::Action(action) => self.api.0.reduce(action),
                input => Err(DispatchError::NotPlainAction(input.describe())),
            },
        }
    }
}
