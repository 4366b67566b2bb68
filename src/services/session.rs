use tokio::sync::{Mutex, watch};

use crate::crypto::token::TokenVerifier;
use crate::error::{AuthError, Result};
use crate::models::credentials::LoginCredentials;
use crate::models::session::{AuthState, LoginOutcome};
use crate::models::user::User;
use crate::repositories::token::TokenStore;
use crate::services::login::LoginExchange;
use crate::state::{StateCell, Subscription};
use crate::validation::credentials::validate_credentials;

/// Owns the login session and is the only writer of its `AuthState`.
///
/// `init`, `login` and `logout` are serialized against each other, so each
/// one observes the state committed by the previous one and the last commit
/// wins. None of them applies a timeout: a hung store or endpoint holds the
/// machine in its current state until it resolves.
pub struct SessionManager<S, C> {
    verifier: TokenVerifier,
    store: S,
    client: C,
    state: StateCell<AuthState>,
    flight: Mutex<()>,
}

impl<S: TokenStore, C: LoginExchange> SessionManager<S, C> {
    /// Creates a new `SessionManager` in the loading state.
    ///
    /// # Arguments
    ///
    /// * `verifier` - Verifies restored and freshly issued tokens.
    /// * `store` - Where the token survives process restarts.
    /// * `client` - Exchanges credentials for a token.
    pub fn new(verifier: TokenVerifier, store: S, client: C) -> Self {
        Self {
            verifier,
            store,
            client,
            state: StateCell::new(AuthState::loading()),
            flight: Mutex::new(()),
        }
    }

    /// The current session state.
    pub fn snapshot(&self) -> AuthState {
        self.state.get()
    }

    /// Calls `callback` with the current state now and on every commit.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<AuthState>
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.state.subscribe(callback)
    }

    /// A receiver for async consumers of the session state.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.watch()
    }

    /// Restores the session from the persisted token.
    ///
    /// Always ends in a terminal state: `Authenticated` when the stored token
    /// verifies, `Unauthenticated` otherwise, with the stored token removed.
    pub async fn init(&self) {
        let _flight = self.flight.lock().await;
        tracing::debug!("🔐 Restoring session...");

        let restored = match self.load_token().await {
            Some(token) => match self.verifier.verify(&token) {
                Some(user) => Some((user, token)),
                None => {
                    tracing::warn!("❌ Persisted token is no longer valid, discarding it");
                    None
                }
            },
            None => None,
        };

        match restored {
            Some((user, token)) => {
                match user.expires_at() {
                    Some(expires_at) => tracing::info!(
                        "✅ Session restored for user: {} (expires {})",
                        user.username,
                        expires_at.to_rfc3339()
                    ),
                    None => tracing::info!("✅ Session restored for user: {}", user.username),
                }
                self.commit(AuthState::authenticated(user, token));
            }
            None => {
                self.discard_token().await;
                self.commit(AuthState::unauthenticated());
            }
        }
    }

    /// Logs in with `credentials`.
    ///
    /// On success the token is persisted and the session becomes
    /// `Authenticated`. Any failure resets the session to `Unauthenticated`,
    /// discarding a previous session, and leaves the store untouched.
    ///
    /// # Returns
    ///
    /// A `LoginOutcome` carrying a user-facing message on failure.
    pub async fn login(&self, credentials: &LoginCredentials) -> LoginOutcome {
        let _flight = self.flight.lock().await;
        tracing::info!("🔐 Login attempt for: {}", credentials.username);

        match self.authenticate(credentials).await {
            Ok((user, token)) => {
                if let Err(e) = self.store.set(&token).await {
                    tracing::warn!("⚠️  Could not persist session token: {}", e);
                }

                tracing::info!("✅ User logged in: {}", user.username);
                self.commit(AuthState::authenticated(user, token));
                LoginOutcome::succeeded()
            }
            Err(e) => {
                tracing::warn!("❌ Login failed for {}: {}", credentials.username, e);
                self.commit(AuthState::unauthenticated());
                LoginOutcome::failed(e.to_string())
            }
        }
    }

    /// Ends the session and forgets the persisted token.
    pub async fn logout(&self) {
        let _flight = self.flight.lock().await;

        self.discard_token().await;
        self.commit(AuthState::unauthenticated());
        tracing::info!("👋 Logged out");
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<(User, String)> {
        validate_credentials(credentials)?;

        let token = self.client.exchange(credentials).await?;
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let user = self.verifier.verify(&token).ok_or(AuthError::InvalidToken)?;
        Ok((user, token))
    }

    async fn load_token(&self) -> Option<String> {
        match self.store.get().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("⚠️  Token store unavailable, starting logged out: {}", e);
                None
            }
        }
    }

    async fn discard_token(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("⚠️  Could not clear persisted token: {}", e);
        }
    }

    fn commit(&self, next: AuthState) {
        tracing::debug!(
            authenticated = next.is_authenticated(),
            "📣 Session state committed"
        );
        self.state.set(next);
    }
}
