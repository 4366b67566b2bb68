use std::future::Future;

use http::StatusCode;
use http::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sonic_rs::JsonValueTrait;

use crate::error::{AuthError, Result};
use crate::models::credentials::LoginCredentials;

/// The path of the login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "/user/login";

/// Exchanges credentials for a bearer token.
pub trait LoginExchange: Send + Sync {
    /// Sends `credentials` to the login endpoint.
    ///
    /// # Returns
    ///
    /// The non-empty token from a successful response, or the error the
    /// endpoint reported.
    fn exchange(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// The request payload for a login.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// The response payload of a successful login.
///
/// `token` stays untyped so a non-string token reads as missing rather than
/// as a malformed body.
#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<sonic_rs::Value>,
}

/// The error payload of a failed login.
#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A `LoginExchange` that talks JSON over HTTP.
#[derive(Clone, Debug)]
pub struct HttpLoginClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpLoginClient {
    /// Creates a new `HttpLoginClient` for the API at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The API base URL, with or without a trailing slash.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Creates a new `HttpLoginClient` reusing an existing HTTP client.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), LOGIN_PATH),
        }
    }

    /// The full URL of the login endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LoginExchange for HttpLoginClient {
    async fn exchange(&self, credentials: &LoginCredentials) -> Result<String> {
        let body = sonic_rs::to_string(&LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        })?;

        tracing::debug!("🌐 POST {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            tracing::warn!("❌ Login endpoint returned {}: {}", status, message);
            return Err(AuthError::Remote { status, message });
        }

        parse_token(&text)
    }
}

/// Extracts the token from a success body.
fn parse_token(body: &str) -> Result<String> {
    let parsed: LoginResponse = sonic_rs::from_str(body)
        .map_err(|e| AuthError::MalformedResponse(first_line(&e.to_string())))?;

    parsed
        .token
        .as_ref()
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingToken)
}

/// sonic-rs diagnostics append the offending source on later lines.
fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}

/// Picks the most specific message available from an error response.
///
/// Order: `error` field, `message` field, raw body text, then a status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = sonic_rs::from_str::<ErrorPayload>(body) {
        let structured = payload
            .error
            .or(payload.message)
            .filter(|message| !message.trim().is_empty());
        if let Some(message) = structured {
            return message;
        }
    }

    let raw = body.trim();
    if !raw.is_empty() && !raw.starts_with('{') {
        return raw.to_string();
    }

    format!("Login failed with status {}", status.as_u16())
}
