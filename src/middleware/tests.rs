use assert_call::{call, CallRecorder};
use futures::{channel::oneshot, executor::LocalPool};
use serde_json::json;

use crate::Store;

use super::*;

fn record(state: &Vec<String>, action: &AnyAction) -> Vec<String> {
    let mut state = state.clone();
    match &action.payload {
        Some(payload) if action.error => state.push(format!("{action}!{payload}")),
        Some(payload) => state.push(format!("{action}:{payload}")),
        None => state.push(action.to_string()),
    }
    state
}

fn async_store(pool: &LocalPool) -> Store<Vec<String>, AnyAction> {
    Store::builder(record, Vec::new())
        .middleware(PromiseMiddleware::new(pool.spawner()))
        .middleware(ThunkMiddleware::new())
        .middleware(LoggerMiddleware::new())
        .build()
}

#[test]
fn logger_passes_actions_through() {
    let s = Store::builder(record, Vec::new())
        .middleware(LoggerMiddleware::new())
        .build();
    s.dispatch(AnyAction::new("A")).unwrap();
    assert_eq!(*s.get_state(), vec!["A"]);
}

#[test]
fn thunk_receives_api() {
    let pool = LocalPool::new();
    let s = async_store(&pool);
    s.dispatch(Dispatch::thunk(|api: &StoreApi<Vec<String>, AnyAction>| {
        api.dispatch(AnyAction::new("FIRST")).unwrap();
        assert_eq!(api.get_state().len(), 1);
        api.dispatch(AnyAction::new("SECOND")).unwrap();
    }))
    .unwrap();
    assert_eq!(*s.get_state(), vec!["FIRST", "SECOND"]);
}

#[test]
fn thunk_without_thunk_middleware_is_rejected() {
    let s = Store::builder(record, Vec::new())
        .middleware(LoggerMiddleware::new())
        .build();
    let r = s.dispatch(Dispatch::thunk(|_| {}));
    assert!(matches!(r, Err(DispatchError::NotPlainAction(_))));
    assert!(s.get_state().is_empty());
}

#[test]
fn promise_fulfilled() {
    let mut pool = LocalPool::new();
    let s = async_store(&pool);
    let (tx, rx) = oneshot::channel();
    s.dispatch(Dispatch::future("FETCH_USER", async move {
        rx.await.unwrap_or_else(|_| Err(json!("canceled")))
    }))
    .unwrap();
    assert_eq!(*s.get_state(), vec!["FETCH_USER_PENDING"]);

    pool.run_until_stalled();
    assert_eq!(*s.get_state(), vec!["FETCH_USER_PENDING"]);

    tx.send(Ok(json!({ "name": "Will" }))).unwrap();
    pool.run_until_stalled();
    assert_eq!(
        *s.get_state(),
        vec![
            "FETCH_USER_PENDING".to_string(),
            r#"FETCH_USER_FULFILLED:{"name":"Will"}"#.to_string(),
        ]
    );
}

#[test]
fn promise_rejected() {
    let mut pool = LocalPool::new();
    let s = async_store(&pool);
    s.dispatch(Dispatch::future("FETCH_TWEETS", async { Err(json!("offline")) }))
        .unwrap();
    pool.run_until_stalled();
    assert_eq!(
        *s.get_state(),
        vec![
            "FETCH_TWEETS_PENDING".to_string(),
            r#"FETCH_TWEETS_REJECTED!"offline""#.to_string(),
        ]
    );
}

#[test]
fn promise_null_output_has_no_payload() {
    let mut pool = LocalPool::new();
    let s = async_store(&pool);
    s.dispatch(Dispatch::future("SAVE", async { Ok(Value::Null) }))
        .unwrap();
    pool.run_until_stalled();
    assert_eq!(*s.get_state(), vec!["SAVE_PENDING", "SAVE_FULFILLED"]);
}

#[test]
fn promise_custom_suffixes() {
    let mut pool = LocalPool::new();
    let s = Store::builder(record, Vec::new())
        .middleware(PromiseMiddleware::new(pool.spawner()).with_suffixes(PromiseSuffixes {
            fulfilled: "SUCCESS".to_string(),
            ..PromiseSuffixes::default()
        }))
        .build();
    s.dispatch(Dispatch::future("LOAD", async { Ok(json!(1)) }))
        .unwrap();
    pool.run_until_stalled();
    assert_eq!(*s.get_state(), vec!["LOAD_PENDING", "LOAD_SUCCESS:1"]);
}

#[test]
fn settled_action_passes_whole_chain() {
    let mut cr = CallRecorder::new();
    let mut pool = LocalPool::new();
    let s = Store::builder(record, Vec::new())
        .middleware(PromiseMiddleware::new(pool.spawner()))
        .middleware_fn(|_, input, next| {
            if let Dispatch::Action(a) = &input {
                call!("{}", a.kind);
            }
            next.run(input)
        })
        .build();
    s.dispatch(Dispatch::future("LOAD", async { Ok(json!(1)) }))
        .unwrap();
    cr.verify("LOAD_PENDING");
    pool.run_until_stalled();
    cr.verify("LOAD_FULFILLED");
}

#[test]
fn future_without_promise_middleware_is_rejected() {
    let s = Store::builder(record, Vec::new()).build();
    let r = s.dispatch(Dispatch::future("LOAD", async { Ok(json!(1)) }));
    assert_eq!(
        r,
        Err(DispatchError::NotPlainAction("a future `LOAD`".to_string()))
    );
}
