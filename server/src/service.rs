//! Endpoint logic, independent of the HTTP layer.

use unistate::users::{ApiResponse, NewUser, UserKey, UserUpdate, MSG_DELETED, MSG_UPDATED};

use crate::{
    db::UserRepository,
    error::{Operation, UsersError},
    validate,
};

pub fn all_users(repo: &UserRepository) -> Result<ApiResponse, UsersError> {
    let users = repo.all().map_err(UsersError::database(Operation::List))?;
    if users.is_empty() {
        return Err(UsersError::NoUsers);
    }
    Ok(ApiResponse::users(users))
}

pub fn add_user(repo: &UserRepository, user: &NewUser) -> Result<ApiResponse, UsersError> {
    let user = validate::new_user(user)?;
    let id = repo
        .insert(&user.user_name, &user.user_email)
        .map_err(UsersError::database(Operation::Insert))?;
    tracing::info!(id, "user inserted");
    Ok(ApiResponse::inserted(id))
}

pub fn update_user(repo: &UserRepository, user: &UserUpdate) -> Result<ApiResponse, UsersError> {
    let (id, user) = validate::user_update(user)?;
    let updated = repo
        .update(id, &user.user_name, &user.user_email)
        .map_err(UsersError::database(Operation::Update))?;
    if updated == 0 {
        return Err(UsersError::NotFound {
            op: Operation::Update,
            id,
        });
    }
    tracing::info!(id, "user updated");
    Ok(ApiResponse::ok(MSG_UPDATED))
}

pub fn delete_user(repo: &UserRepository, key: &UserKey) -> Result<ApiResponse, UsersError> {
    let id = validate::user_key(key)?;
    let deleted = repo
        .delete(id)
        .map_err(UsersError::database(Operation::Delete))?;
    if deleted == 0 {
        return Err(UsersError::NotFound {
            op: Operation::Delete,
            id,
        });
    }
    tracing::info!(id, "user deleted");
    Ok(ApiResponse::ok(MSG_DELETED))
}

/// Collapses a result into the envelope sent to the client.
pub fn respond(result: Result<ApiResponse, UsersError>) -> ApiResponse {
    result.unwrap_or_else(|e| e.to_response())
}
