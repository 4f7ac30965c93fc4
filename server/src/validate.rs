//! Request validation.

use std::sync::LazyLock;

use regex::Regex;
use unistate::users::{NewUser, UserId, UserKey, UserUpdate};

use crate::error::UsersError;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    let atom = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+";
    let label = r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?";
    Regex::new(&format!(r"^{atom}(?:\.{atom})*@{label}(?:\.{label})+$"))
        .expect("email pattern is valid")
});

const MAX_LOCAL_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;

/// A name and email that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    pub user_name: String,
    pub user_email: String,
}

/// Returns the trimmed value if it is present and not blank.
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.rsplit_once('@') else {
        return false;
    };
    local.len() <= MAX_LOCAL_LEN && email.len() <= MAX_EMAIL_LEN && EMAIL.is_match(email)
}

fn valid_user(name: Option<&str>, email: Option<&str>) -> Result<ValidUser, UsersError> {
    let (Some(name), Some(email)) = (required(name), required(email)) else {
        return Err(UsersError::MissingFields);
    };
    if !is_valid_email(email) {
        return Err(UsersError::InvalidEmail(email.to_string()));
    }
    Ok(ValidUser {
        user_name: name.to_string(),
        user_email: email.to_string(),
    })
}

pub fn new_user(user: &NewUser) -> Result<ValidUser, UsersError> {
    valid_user(user.user_name.as_deref(), user.user_email.as_deref())
}

pub fn user_update(user: &UserUpdate) -> Result<(UserId, ValidUser), UsersError> {
    let id = user.id.ok_or(UsersError::MissingFields)?;
    Ok((
        id,
        valid_user(user.user_name.as_deref(), user.user_email.as_deref())?,
    ))
}

pub fn user_key(key: &UserKey) -> Result<UserId, UsersError> {
    key.id.ok_or(UsersError::MissingFields)
}
