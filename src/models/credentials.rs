use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The username and password submitted for a login.
///
/// Input-only: never stored, wiped from memory on drop, redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LoginCredentials {
    /// The user's username.
    pub username: String,
    /// The user's password.
    pub password: String,
}

impl LoginCredentials {
    /// Creates a new `LoginCredentials`.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
