use std::fmt::Debug;

use futures::task::{LocalSpawn, LocalSpawnExt};
use serde_json::Value;

use crate::{Action, AnyAction, Dispatch, DispatchError, Middleware, Next, StoreApi};

#[cfg(test)]
mod tests;

/// Logs the previous state, the action and the next state of each reduced action.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggerMiddleware {
    _private: (),
}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, A> Middleware<S, A> for LoggerMiddleware
where
    S: Debug + 'static,
    A: Action + Debug,
{
    fn handle(
        &self,
        api: &StoreApi<S, A>,
        input: Dispatch<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<(), DispatchError> {
        let Dispatch::Action(action) = input else {
            return next.run(input);
        };
        let kind = action.action_type().to_string();
        tracing::debug!(target: "unistate::logger", action = %kind, prev = ?api.get_state(), "prev state");
        tracing::debug!(target: "unistate::logger", action = %kind, payload = ?action, "action");
        let result = next.run(Dispatch::Action(action));
        match &result {
            Ok(()) => {
                tracing::debug!(target: "unistate::logger", action = %kind, next = ?api.get_state(), "next state")
            }
            Err(e) => tracing::warn!(target: "unistate::logger", action = %kind, error = %e, "dispatch failed"),
        }
        result
    }
}

/// Runs dispatched thunks with the store API instead of passing them on.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThunkMiddleware {
    _private: (),
}

impl ThunkMiddleware {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: 'static, A: 'static> Middleware<S, A> for ThunkMiddleware {
    fn handle(
        &self,
        api: &StoreApi<S, A>,
        input: Dispatch<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<(), DispatchError> {
        match input {
            Dispatch::Thunk(f) => {
                f(api);
                Ok(())
            }
            input => next.run(input),
        }
    }
}

/// Type suffixes used by [`PromiseMiddleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseSuffixes {
    pub pending: String,
    pub fulfilled: String,
    pub rejected: String,
}

impl PromiseSuffixes {
    pub fn pending(&self, kind: &str) -> String {
        format!("{kind}_{}", self.pending)
    }
    pub fn fulfilled(&self, kind: &str) -> String {
        format!("{kind}_{}", self.fulfilled)
    }
    pub fn rejected(&self, kind: &str) -> String {
        format!("{kind}_{}", self.rejected)
    }
}
impl Default for PromiseSuffixes {
    fn default() -> Self {
        Self {
            pending: "PENDING".to_string(),
            fulfilled: "FULFILLED".to_string(),
            rejected: "REJECTED".to_string(),
        }
    }
}

/// Resolves dispatched futures into actions.
///
/// For a future dispatched under type `T`, `T_PENDING` is passed on immediately.
/// When the future completes, `T_FULFILLED` with the output as payload
/// or `T_REJECTED` with the error as payload is dispatched through the whole chain.
/// Futures run on the given spawner.
pub struct PromiseMiddleware {
    spawner: Box<dyn LocalSpawn>,
    suffixes: PromiseSuffixes,
}

impl PromiseMiddleware {
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self {
            spawner: Box::new(spawner),
            suffixes: PromiseSuffixes::default(),
        }
    }
    pub fn with_suffixes(mut self, suffixes: PromiseSuffixes) -> Self {
        self.suffixes = suffixes;
        self
    }
    pub fn suffixes(&self) -> &PromiseSuffixes {
        &self.suffixes
    }
}

impl<S, A> Middleware<S, A> for PromiseMiddleware
where
    S: 'static,
    A: From<AnyAction> + 'static,
{
    fn handle(
        &self,
        api: &StoreApi<S, A>,
        input: Dispatch<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<(), DispatchError> {
        let Dispatch::Future { kind, future } = input else {
            return next.run(input);
        };
        next.run(Dispatch::Action(A::from(AnyAction::new(
            self.suffixes.pending(&kind),
        ))))?;

        let api = api.clone();
        let fulfilled = self.suffixes.fulfilled(&kind);
        let rejected = self.suffixes.rejected(&kind);
        self.spawner
            .spawn_local(async move {
                let action = match future.await {
                    Ok(Value::Null) => AnyAction::new(fulfilled),
                    Ok(value) => AnyAction::new(fulfilled).with_payload(value),
                    Err(error) => AnyAction::failure(rejected, error),
                };
                let kind = action.kind.clone();
                if let Err(e) = api.dispatch(A::from(action)) {
                    tracing::warn!(action = %kind, error = %e, "failed to dispatch settled future");
                }
            })
            .map_err(|e| DispatchError::Spawn(e.to_string()))
    }
}
