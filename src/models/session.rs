use serde::Serialize;

use crate::models::user::User;

/// The snapshot of the current login session broadcast to subscribers.
///
/// Fields are private so the only shapes that exist are the three states of
/// the session machine: `isAuthenticated` holds exactly when both `user` and
/// `token` are present, and `loading` only before the first restore finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    is_authenticated: bool,
    user: Option<User>,
    token: Option<String>,
    loading: bool,
}

impl AuthState {
    /// The initial state, before the persisted session has been restored.
    pub fn loading() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            token: None,
            loading: true,
        }
    }

    /// The logged-out state.
    pub fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            token: None,
            loading: false,
        }
    }

    /// A session backed by a verified token.
    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
            token: Some(token),
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The `Authorization` header value for the current session, if any.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {}", token))
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}

/// The result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginOutcome {
    /// A successful login.
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed login carrying a message for the user.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: "1".to_string(),
            username: "alice".to_string(),
            exp: 2_000_000_000,
            iat: 1_999_996_400,
        }
    }

    #[test]
    fn default_state_is_loading() {
        let state = AuthState::default();
        assert!(state.is_loading());
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
        assert!(state.token().is_none());
    }

    #[test]
    fn authenticated_state_carries_user_and_token() {
        let state = AuthState::authenticated(alice(), "abc.def.ghi".to_string());
        assert!(state.is_authenticated());
        assert!(!state.is_loading());
        assert_eq!(state.user(), Some(&alice()));
        assert_eq!(state.bearer().as_deref(), Some("Bearer abc.def.ghi"));
    }

    #[test]
    fn unauthenticated_state_has_no_bearer() {
        let state = AuthState::unauthenticated();
        assert!(!state.is_loading());
        assert!(state.bearer().is_none());
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let json = sonic_rs::to_string(&AuthState::unauthenticated()).unwrap();
        assert_eq!(
            json,
            r#"{"isAuthenticated":false,"user":null,"token":null,"loading":false}"#
        );
    }

    #[test]
    fn successful_outcome_omits_error() {
        let json = sonic_rs::to_string(&LoginOutcome::succeeded()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let failed = LoginOutcome::failed("No token received");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("No token received"));
    }
}
