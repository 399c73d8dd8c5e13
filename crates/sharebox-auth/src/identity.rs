//! Authenticated caller identity

use std::fmt;

use crate::models::User;

/// The resolved identity of an authenticated caller
///
/// Produced from a validated bearer token and passed explicitly to every
/// authorization and lifecycle call.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub user_key: String,
    pub username: String,
}

impl Identity {
    pub fn new(user_key: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            username: username.into(),
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self::new(user.key.clone(), user.username.clone())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}:{})", self.username, self.user_key)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
