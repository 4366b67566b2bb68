use http::StatusCode;
use thiserror::Error;

/// The session core's error type.
///
/// The `Display` text of every variant is what a failed login reports to the
/// user, so keep messages human-readable.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed static configuration, such as the verification key.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credentials rejected before reaching the network.
    #[error("{0}")]
    Validation(String),

    /// The login endpoint could not be reached.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The login endpoint answered with a non-success status.
    #[error("{message}")]
    Remote {
        /// The HTTP status returned by the endpoint.
        status: StatusCode,
        /// The error message supplied by the endpoint.
        message: String,
    },

    /// A success response without a usable token.
    #[error("No token received")]
    MissingToken,

    /// A token that failed local verification.
    #[error("Invalid token received")]
    InvalidToken,

    /// A success response whose body is not the expected JSON.
    #[error("Malformed login response: {0}")]
    MalformedResponse(String),

    /// An I/O error from the persistent store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] sonic_rs::Error),
}

/// A `Result` type that uses `AuthError` as the error type.
pub type Result<T> = std::result::Result<T, AuthError>;
