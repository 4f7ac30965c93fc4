use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use unistate::users::{
    ApiResponse, UserId, MSG_INVALID_EMAIL, MSG_NOT_DELETED, MSG_NOT_INSERTED, MSG_NOT_UPDATED,
    MSG_NO_USER, MSG_REQUIRED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Insert,
    Update,
    Delete,
}

impl Operation {
    /// Message sent to the client when the operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => MSG_NO_USER,
            Operation::Insert => MSG_NOT_INSERTED,
            Operation::Update => MSG_NOT_UPDATED,
            Operation::Delete => MSG_NOT_DELETED,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::List => "list",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

#[derive(Debug, Error)]
pub enum UsersError {
    #[error("required field missing or empty")]
    MissingFields,
    #[error("invalid email address `{0}`")]
    InvalidEmail(String),
    #[error("users table is empty")]
    NoUsers,
    #[error("{op}: no user with id {id}")]
    NotFound { op: Operation, id: UserId },
    #[error("{op}: database error: {source}")]
    Database {
        op: Operation,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{op}: blocking task failed: {source}")]
    Task {
        op: Operation,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl UsersError {
    pub fn database(op: Operation) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| UsersError::Database { op, source }
    }

    pub fn task(op: Operation) -> impl FnOnce(tokio::task::JoinError) -> Self {
        move |source| UsersError::Task { op, source }
    }

    /// Message sent to the client.
    ///
    /// Database failures are not distinguished from other failures of the same operation.
    pub fn message(&self) -> &'static str {
        match self {
            UsersError::MissingFields => MSG_REQUIRED,
            UsersError::InvalidEmail(_) => MSG_INVALID_EMAIL,
            UsersError::NoUsers => MSG_NO_USER,
            UsersError::NotFound { op, .. }
            | UsersError::Database { op, .. }
            | UsersError::Task { op, .. } => op.failure_message(),
        }
    }

    pub fn to_response(&self) -> ApiResponse {
        ApiResponse::failure(self.message())
    }
}

impl IntoResponse for UsersError {
    fn into_response(self) -> Response {
        match &self {
            UsersError::Database { .. } | UsersError::Task { .. } => {
                tracing::error!(error = %self, "request failed")
            }
            _ => tracing::debug!(error = %self, "request rejected"),
        }
        Json(self.to_response()).into_response()
    }
}
