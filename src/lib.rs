//! Client-side login session core.
//!
//! Verifies signed bearer tokens against a static public key, persists the
//! session token across restarts, and publishes the session state to
//! subscribers through [`services::session::SessionManager`].

pub mod config;
pub mod error;
pub mod state;

pub mod crypto {
    pub mod jwk;
    pub mod token;

    #[cfg(any(test, feature = "test-support"))]
    pub mod fixtures;
}

pub mod models {
    pub mod credentials;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod token;
}

pub mod services {
    pub mod login;
    pub mod session;
}

pub mod validation {
    pub mod credentials;
}

pub use crypto::jwk::VerificationKey;
pub use crypto::token::TokenVerifier;
pub use error::{AuthError, Result};
pub use models::credentials::LoginCredentials;
pub use models::session::{AuthState, LoginOutcome};
pub use models::user::User;
pub use repositories::token::{FileTokenStore, MemoryTokenStore, NoopTokenStore, TokenStore};
pub use services::login::{HttpLoginClient, LoginExchange};
pub use services::session::SessionManager;
