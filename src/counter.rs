//! Counter store.

use crate::{AnyAction, LoggerMiddleware, Store};

#[cfg(test)]
mod tests;

pub const INC: &str = "INC";
pub const DEC: &str = "DEC";

/// `INC` adds the payload and `DEC` subtracts it. The payload defaults to 1.
pub fn counter_reducer(state: &i64, action: &AnyAction) -> i64 {
    let amount = || action.payload_as::<i64>().unwrap_or(1);
    match action.kind.as_str() {
        INC => state.saturating_add(amount()),
        DEC => state.saturating_sub(amount()),
        _ => *state,
    }
}

pub fn counter_store() -> Store<i64, AnyAction> {
    Store::builder(counter_reducer, 1)
        .middleware(LoggerMiddleware::new())
        .build()
}

pub fn inc(amount: i64) -> AnyAction {
    AnyAction::new(INC).with_payload(amount)
}

pub fn dec(amount: i64) -> AnyAction {
    AnyAction::new(DEC).with_payload(amount)
}
