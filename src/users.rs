//! Client side of the users CRUD demo.
//!
//! [`UsersActions`] calls a [`UsersApi`] backend and, when the backend reports success,
//! dispatches a [`UsersAction`] to a [`UsersStore`].
//! Failures reported by the backend are passed to an alert callback.
//! Transport failures are only logged. Neither is stored in the state.

use std::rc::Rc;

use futures::{
    future::LocalBoxFuture,
    task::{LocalSpawn, LocalSpawnExt},
};
use parse_display::Display;
use serde::{Deserialize, Serialize};

use crate::{Action, DispatchError, LoggerMiddleware, Store};


pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub user_email: String,
}

impl User {
    /// Builds the row the backend stores for the submitted fields, which it trims.
    pub fn stored(id: UserId, user_name: &str, user_email: &str) -> Self {
        Self {
            id,
            user_name: user_name.trim().to_string(),
            user_email: user_email.trim().to_string(),
        }
    }
}

/// Body of `POST /add-user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

impl NewUser {
    pub fn new(user_name: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            user_email: Some(user_email.into()),
        }
    }
}

/// Body of `POST /update-user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// Body of `POST /delete-user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKey {
    #[serde(default)]
    pub id: Option<UserId>,
}

/// Response envelope of every endpoint.
///
/// `success` is 1 on success and 0 on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

impl ApiResponse {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            success: 1,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }
    pub fn inserted(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::ok(MSG_INSERTED)
        }
    }
    pub fn users(users: Vec<User>) -> Self {
        Self {
            success: 1,
            users: Some(users),
            ..Self::default()
        }
    }
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: 0,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }
    pub fn is_success(&self) -> bool {
        self.success == 1
    }
    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or_default()
    }
}

pub const MSG_INSERTED: &str = "User Inserted.";
pub const MSG_NOT_INSERTED: &str = "User Not Inserted!";
pub const MSG_UPDATED: &str = "User Updated.";
pub const MSG_NOT_UPDATED: &str = "User Not Updated!";
pub const MSG_DELETED: &str = "User Deleted.";
pub const MSG_NOT_DELETED: &str = "User Not Deleted!";
pub const MSG_NO_USER: &str = "No User Found!";
pub const MSG_INVALID_EMAIL: &str = "Invalid Email Address!";
pub const MSG_REQUIRED: &str = "Please fill all the required fields!";

/// A failure to reach the backend or to read its response.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[display("transport error: {0}")]
    Transport(String),
    #[display("malformed response: {0}")]
    Decode(String),
}

impl std::error::Error for ApiError {}

pub type ApiFuture = LocalBoxFuture<'static, Result<ApiResponse, ApiError>>;

/// Backend of the users demo.
pub trait UsersApi: 'static {
    fn all_users(&self) -> ApiFuture;
    fn add_user(&self, user: NewUser) -> ApiFuture;
    fn update_user(&self, user: UserUpdate) -> ApiFuture;
    fn delete_user(&self, key: UserKey) -> ApiFuture;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user: User,
    pub is_editing: bool,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            user,
            is_editing: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsersState {
    pub users: Vec<UserRow>,
}

impl UsersState {
    pub fn get(&self, id: UserId) -> Option<&UserRow> {
        self.users.iter().find(|row| row.user.id == id)
    }
    pub fn editing(&self) -> Option<&UserRow> {
        self.users.iter().find(|row| row.is_editing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsersAction {
    /// Replaces the list, newest first.
    Loaded(Vec<User>),
    Inserted(User),
    EditMode(UserId),
    CancelEdit(UserId),
    Updated(User),
    Deleted(UserId),
}

impl Action for UsersAction {
    fn action_type(&self) -> &str {
        match self {
            UsersAction::Loaded(_) => "USERS_LOADED",
            UsersAction::Inserted(_) => "USER_INSERTED",
            UsersAction::EditMode(_) => "USER_EDIT_MODE",
            UsersAction::CancelEdit(_) => "USER_CANCEL_EDIT",
            UsersAction::Updated(_) => "USER_UPDATED",
            UsersAction::Deleted(_) => "USER_DELETED",
        }
    }
}

pub fn users_reducer(state: &UsersState, action: &UsersAction) -> UsersState {
    let mut s = state.clone();
    match action {
        UsersAction::Loaded(users) => {
            s.users = users.iter().rev().cloned().map(UserRow::from).collect();
        }
        UsersAction::Inserted(user) => s.users.push(user.clone().into()),
        UsersAction::EditMode(id) => {
            for row in &mut s.users {
                row.is_editing = row.user.id == *id;
            }
        }
        UsersAction::CancelEdit(id) => {
            for row in s.users.iter_mut().filter(|row| row.user.id == *id) {
                row.is_editing = false;
            }
        }
        UsersAction::Updated(user) => {
            for row in s.users.iter_mut().filter(|row| row.user.id == user.id) {
                *row = user.clone().into();
            }
        }
        UsersAction::Deleted(id) => s.users.retain(|row| row.user.id != *id),
    }
    s
}

pub type UsersStore = Store<UsersState, UsersAction>;

pub fn users_store() -> UsersStore {
    Store::builder(users_reducer, UsersState::default())
        .middleware(LoggerMiddleware::new())
        .build()
}

/// Action creators for the users demo.
#[derive(Clone)]
pub struct UsersActions {
    store: UsersStore,
    api: Rc<dyn UsersApi>,
    spawner: Rc<dyn LocalSpawn>,
    alert: Rc<dyn Fn(&str)>,
}

impl UsersActions {
    pub fn new(store: UsersStore, api: impl UsersApi, spawner: impl LocalSpawn + 'static) -> Self {
        Self {
            store,
            api: Rc::new(api),
            spawner: Rc::new(spawner),
            alert: Rc::new(|msg: &str| tracing::warn!(msg, "users backend reported a failure")),
        }
    }

    /// Replaces the callback that shows backend failure messages.
    pub fn with_alert(mut self, alert: impl Fn(&str) + 'static) -> Self {
        self.alert = Rc::new(alert);
        self
    }

    pub fn store(&self) -> &UsersStore {
        &self.store
    }

    /// Loads every user. The list is shown newest first.
    ///
    /// An empty table leaves the state unchanged.
    pub fn fetch_users(&self) -> Result<(), DispatchError> {
        let request = self.api.all_users();
        self.spawn(request, |_, res| {
            if res.is_success() {
                Some(UsersAction::Loaded(res.users.unwrap_or_default()))
            } else {
                tracing::debug!(msg = res.message(), "no users loaded");
                None
            }
        })
    }

    pub fn insert_user(
        &self,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Result<(), DispatchError> {
        let user = NewUser::new(user_name, user_email);
        let request = self.api.add_user(user.clone());
        self.spawn(request, move |this, res| match (res.is_success(), res.id) {
            (true, Some(id)) => Some(UsersAction::Inserted(User::stored(
                id,
                user.user_name.as_deref().unwrap_or_default(),
                user.user_email.as_deref().unwrap_or_default(),
            ))),
            (true, None) => {
                tracing::warn!("insert succeeded without an id");
                None
            }
            (false, _) => {
                (this.alert)(res.message());
                None
            }
        })
    }

    /// Puts the row with `id` in edit mode. Other rows leave edit mode.
    pub fn edit_mode(&self, id: UserId) -> Result<(), DispatchError> {
        self.store.dispatch(UsersAction::EditMode(id))
    }

    pub fn cancel_edit(&self, id: UserId) -> Result<(), DispatchError> {
        self.store.dispatch(UsersAction::CancelEdit(id))
    }

    pub fn update_user(
        &self,
        id: UserId,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Result<(), DispatchError> {
        let (user_name, user_email) = (user_name.into(), user_email.into());
        let user = User::stored(id, &user_name, &user_email);
        let request = self.api.update_user(UserUpdate {
            id: Some(id),
            user_name: Some(user_name),
            user_email: Some(user_email),
        });
        self.spawn(request, move |this, res| {
            if res.is_success() {
                Some(UsersAction::Updated(user))
            } else {
                (this.alert)(res.message());
                None
            }
        })
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), DispatchError> {
        let request = self.api.delete_user(UserKey { id: Some(id) });
        self.spawn(request, move |this, res| {
            if res.is_success() {
                Some(UsersAction::Deleted(id))
            } else {
                (this.alert)(res.message());
                None
            }
        })
    }

    fn spawn(
        &self,
        request: ApiFuture,
        on_response: impl FnOnce(&Self, ApiResponse) -> Option<UsersAction> + 'static,
    ) -> Result<(), DispatchError> {
        let this = self.clone();
        self.spawner
            .spawn_local(async move {
                match request.await {
                    Ok(res) => {
                        if let Some(action) = on_response(&this, res) {
                            if let Err(e) = this.store.dispatch(action) {
                                tracing::warn!(error = %e, "failed to apply users response");
                            }
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "users request failed"),
                }
            })
            .map_err(|e| DispatchError::Spawn(e.to_string()))
    }
}
