//! User profile and tweets store with asynchronous fetches.
//!
//! The store is built with [`PromiseMiddleware`], [`ThunkMiddleware`] and [`LoggerMiddleware`], in that order.
//! Fetches are dispatched as futures under `FETCH_USER` and `FETCH_TWEETS`,
//! and resolve into `*_PENDING`, `*_FULFILLED` and `*_REJECTED` actions.

use std::{future::Future, time::Duration};

use futures::task::LocalSpawn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    AnyAction, Dispatch, LoggerMiddleware, PromiseMiddleware, Scheduler, Store, StoreApi,
    ThunkMiddleware,
};


pub const FETCH_USER: &str = "FETCH_USER";
pub const FETCH_TWEETS: &str = "FETCH_TWEETS";
pub const SET_USER_NAME: &str = "SET_USER_NAME";
pub const SET_USER_AGE: &str = "SET_USER_AGE";
pub const ADD_TWEET: &str = "ADD_TWEET";
pub const UPDATE_TWEET: &str = "UPDATE_TWEET";
pub const DELETE_TWEET: &str = "DELETE_TWEET";

/// Delay of the simulated fetches.
pub const FETCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub fetching: bool,
    pub fetched: bool,
    pub user: User,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweetsState {
    pub fetching: bool,
    pub fetched: bool,
    pub tweets: Vec<Tweet>,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user: UserState,
    pub tweets: TweetsState,
}

pub type AppStore = Store<AppState, AnyAction>;

fn phase<'a>(action: &'a AnyAction, kind: &str) -> Option<&'a str> {
    action.kind.strip_prefix(kind)?.strip_prefix('_')
}

fn payload<T: DeserializeOwned>(action: &AnyAction) -> Result<T, Value> {
    action.payload_as().ok_or_else(|| {
        Value::String(format!("malformed payload for {}", action.kind))
    })
}

pub fn user_reducer(state: &UserState, action: &AnyAction) -> UserState {
    let mut s = state.clone();
    match phase(action, FETCH_USER) {
        Some("PENDING") => s.fetching = true,
        Some("REJECTED") => {
            s.fetching = false;
            s.error = action.payload.clone();
        }
        Some("FULFILLED") => {
            s.fetching = false;
            match payload(action) {
                Ok(user) => {
                    s.fetched = true;
                    s.user = user;
                }
                Err(e) => s.error = Some(e),
            }
        }
        _ => match action.kind.as_str() {
            SET_USER_NAME => s.user.name = action.payload_as(),
            SET_USER_AGE => s.user.age = action.payload_as(),
            _ => return state.clone(),
        },
    }
    s
}

pub fn tweets_reducer(state: &TweetsState, action: &AnyAction) -> TweetsState {
    let mut s = state.clone();
    match phase(action, FETCH_TWEETS) {
        Some("PENDING") => s.fetching = true,
        Some("REJECTED") => {
            s.fetching = false;
            s.error = action.payload.clone();
        }
        Some("FULFILLED") => {
            s.fetching = false;
            match payload(action) {
                Ok(tweets) => {
                    s.fetched = true;
                    s.tweets = tweets;
                }
                Err(e) => s.error = Some(e),
            }
        }
        _ => match action.kind.as_str() {
            ADD_TWEET => match payload::<Tweet>(action) {
                Ok(tweet) => s.tweets.push(tweet),
                Err(e) => s.error = Some(e),
            },
            UPDATE_TWEET => match payload::<Tweet>(action) {
                Ok(tweet) => {
                    if let Some(t) = s.tweets.iter_mut().find(|t| t.id == tweet.id) {
                        *t = tweet;
                    }
                }
                Err(e) => s.error = Some(e),
            },
            DELETE_TWEET => match payload::<u64>(action) {
                Ok(id) => s.tweets.retain(|t| t.id != id),
                Err(e) => s.error = Some(e),
            },
            _ => return state.clone(),
        },
    }
    s
}

/// Combines [`user_reducer`] and [`tweets_reducer`].
pub fn app_reducer(state: &AppState, action: &AnyAction) -> AppState {
    AppState {
        user: user_reducer(&state.user, action),
        tweets: tweets_reducer(&state.tweets, action),
    }
}

pub fn app_store(spawner: impl LocalSpawn + 'static) -> AppStore {
    Store::builder(app_reducer, AppState::default())
        .middleware(PromiseMiddleware::new(spawner))
        .middleware(ThunkMiddleware::new())
        .middleware(LoggerMiddleware::new())
        .build()
}

/// Resolves to `value` once `delay` has elapsed on `scheduler`.
///
/// Fails if the underlying task is canceled or the scheduler is dropped.
pub fn simulated_fetch<T>(
    scheduler: &Scheduler,
    delay: Duration,
    value: T,
) -> impl Future<Output = Result<T, String>> + 'static
where
    T: 'static,
{
    let done = scheduler.schedule(delay, || {}).completion();
    async move {
        done.await.map_err(|e| e.to_string())?;
        Ok(value)
    }
}

fn resolve<T: Serialize>(
    fetch: impl Future<Output = Result<T, String>> + 'static,
) -> impl Future<Output = Result<Value, Value>> + 'static {
    async move {
        let value = fetch.await.map_err(Value::String)?;
        serde_json::to_value(value).map_err(|e| Value::String(e.to_string()))
    }
}

pub fn fetch_user(
    fetch: impl Future<Output = Result<User, String>> + 'static,
) -> Dispatch<AppState, AnyAction> {
    Dispatch::future(FETCH_USER, resolve(fetch))
}

pub fn fetch_tweets(
    fetch: impl Future<Output = Result<Vec<Tweet>, String>> + 'static,
) -> Dispatch<AppState, AnyAction> {
    Dispatch::future(FETCH_TWEETS, resolve(fetch))
}

/// A thunk that starts both fetches on `scheduler`, the user first.
pub fn load_profile(
    scheduler: &Scheduler,
    user: User,
    tweets: Vec<Tweet>,
) -> Dispatch<AppState, AnyAction> {
    let scheduler = scheduler.clone();
    Dispatch::thunk(move |api: &StoreApi<AppState, AnyAction>| {
        for d in [
            fetch_user(simulated_fetch(&scheduler, FETCH_DELAY, user)),
            fetch_tweets(simulated_fetch(&scheduler, FETCH_DELAY, tweets)),
        ] {
            if let Err(e) = api.dispatch(d) {
                tracing::warn!(error = %e, "failed to start fetch");
            }
        }
    })
}

pub fn set_user_name(name: impl Into<String>) -> AnyAction {
    AnyAction::new(SET_USER_NAME).with_payload(name.into())
}

pub fn set_user_age(age: u32) -> AnyAction {
    AnyAction::new(SET_USER_AGE).with_payload(age)
}

pub fn add_tweet(id: u64, text: impl Into<String>) -> AnyAction {
    AnyAction::new(ADD_TWEET).with_payload(serde_json::json!({ "id": id, "text": text.into() }))
}

pub fn update_tweet(id: u64, text: impl Into<String>) -> AnyAction {
    AnyAction::new(UPDATE_TWEET).with_payload(serde_json::json!({ "id": id, "text": text.into() }))
}

pub fn delete_tweet(id: u64) -> AnyAction {
    AnyAction::new(DELETE_TWEET).with_payload(id)
}
