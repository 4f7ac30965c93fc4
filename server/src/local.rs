//! In-process [`UsersApi`] backed by a [`UserRepository`].

use std::sync::Arc;

use futures::future::{self, FutureExt};
use unistate::users::{ApiFuture, NewUser, UserKey, UserUpdate, UsersApi};

use crate::{db::UserRepository, service};

/// Serves client requests directly from the repository, without HTTP.
#[derive(Clone)]
pub struct LocalUsersApi {
    repo: Arc<UserRepository>,
}

impl LocalUsersApi {
    pub fn new(repo: Arc<UserRepository>) -> Self {
        Self { repo }
    }
}

impl UsersApi for LocalUsersApi {
    fn all_users(&self) -> ApiFuture {
        future::ready(Ok(service::respond(service::all_users(&self.repo)))).boxed_local()
    }
    fn add_user(&self, user: NewUser) -> ApiFuture {
        future::ready(Ok(service::respond(service::add_user(&self.repo, &user)))).boxed_local()
    }
    fn update_user(&self, user: UserUpdate) -> ApiFuture {
        future::ready(Ok(service::respond(service::update_user(&self.repo, &user))))
            .boxed_local()
    }
    fn delete_user(&self, key: UserKey) -> ApiFuture {
        future::ready(Ok(service::respond(service::delete_user(&self.repo, &key)))).boxed_local()
    }
}
