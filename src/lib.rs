//! Single-threaded unidirectional state containers.
//!
//! Actions flow from an event handler through one dispatch point into the
//! state container that owns the affected state. The container computes the
//! next snapshot and notifies its subscribers.
//!
//! - [`Dispatcher`] is a Flux-style broadcast channel.
//! - [`Store`] is a Redux-style reducer store with a [`Middleware`] chain.
//! - [`Scheduler`] defers actions in virtual or real time.
//!
//! The [`todos`], [`counter`], [`tweets`] and [`users`] modules build small
//! applications on top of these.

mod action;
mod dispatcher;
mod listeners;
mod middleware;
mod reducer;
mod scheduler;
mod store;
mod subscription;
mod utils;

pub mod counter;
pub mod timer;
pub mod todos;
pub mod tweets;
pub mod users;

pub use action::*;
pub use dispatcher::*;
pub use listeners::*;
pub use middleware::*;
pub use reducer::*;
pub use scheduler::*;
pub use store::*;
pub use subscription::*;
