use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};

/// The default base URL of the login API.
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The base URL of the login API, without a trailing slash.
    pub api_url: String,
    /// The public JSON Web Key used to verify session tokens.
    pub jwt_public_key: String,
    /// The directory holding the persisted token, if persistence is available.
    pub token_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let jwt_public_key = env::var("JWT_PUBLIC_KEY")
            .context("JWT_PUBLIC_KEY must be set (public JWK as JSON)")?;

        if jwt_public_key.trim().is_empty() {
            anyhow::bail!("JWT_PUBLIC_KEY must not be empty");
        }

        let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: normalize_base_url(&api_url),
            jwt_public_key,
            token_dir: env::var_os("TOKEN_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
