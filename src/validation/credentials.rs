use crate::error::{AuthError, Result};
use crate::models::credentials::LoginCredentials;

/// Validates a username before it is sent to the login endpoint.
///
/// # Arguments
///
/// * `username` - The username to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the username is usable.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AuthError::Validation("Username is required".to_string()));
    }

    Ok(())
}

/// Validates a password before it is sent to the login endpoint.
///
/// Strength rules belong to the server; only emptiness is rejected here.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }

    Ok(())
}

/// Validates a full set of login credentials.
pub fn validate_credentials(credentials: &LoginCredentials) -> Result<()> {
    validate_username(&credentials.username)?;
    validate_password(&credentials.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_username_is_rejected() {
        let err = validate_credentials(&LoginCredentials::new("   ", "secret")).unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = validate_credentials(&LoginCredentials::new("alice", "")).unwrap_err();
        assert_eq!(err.to_string(), "Password is required");
    }

    #[test]
    fn whitespace_password_is_left_to_the_server() {
        assert!(validate_credentials(&LoginCredentials::new("alice", "  ")).is_ok());
    }
}
