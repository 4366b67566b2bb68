use std::env;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use session_core::config::Config;
use session_core::{
    FileTokenStore, HttpLoginClient, LoginCredentials, NoopTokenStore, SessionManager,
    TokenStore, TokenVerifier, VerificationKey,
};

/// What the binary was asked to do after restoring the session.
enum Command {
    Status,
    Login { username: String },
    Logout,
}

impl Command {
    fn from_args() -> anyhow::Result<Self> {
        let mut args = env::args().skip(1);
        match args.next().as_deref() {
            None | Some("status") => Ok(Command::Status),
            Some("login") => {
                let username = args
                    .next()
                    .context("usage: session-core login <username> (password in SESSION_PASSWORD)")?;
                Ok(Command::Login { username })
            }
            Some("logout") => Ok(Command::Logout),
            Some(other) => anyhow::bail!("unknown command: {} (expected status, login or logout)", other),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let command = Command::from_args()?;

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let key = match VerificationKey::from_jwk_json(&config.jwt_public_key) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("❌ Failed to load JWT_PUBLIC_KEY: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("✅ Verification key loaded ({:?})", key.algorithm());
    let verifier = TokenVerifier::new(key);

    let client = HttpLoginClient::new(&config.api_url)?;
    tracing::info!("✅ Login endpoint: {}", client.endpoint());

    match config.token_dir.as_deref() {
        Some(dir) => {
            let store = FileTokenStore::new(dir);
            tracing::info!("✅ Token store: {}", store.path().display());
            run(SessionManager::new(verifier, store, client), command).await
        }
        None => {
            tracing::warn!("⚠️  TOKEN_DIR not set, the session will not survive a restart");
            run(SessionManager::new(verifier, NoopTokenStore, client), command).await
        }
    }
}

async fn run<S: TokenStore>(
    session: SessionManager<S, HttpLoginClient>,
    command: Command,
) -> anyhow::Result<()> {
    let _subscription = session.subscribe(|state| {
        tracing::debug!(
            loading = state.is_loading(),
            authenticated = state.is_authenticated(),
            "📣 Session state changed"
        );
    });

    session.init().await;

    match command {
        Command::Status => {}
        Command::Login { username } => {
            let password = Zeroizing::new(
                env::var("SESSION_PASSWORD").context("SESSION_PASSWORD must be set to log in")?,
            );
            let credentials = LoginCredentials::new(username, password.as_str());

            let outcome = session.login(&credentials).await;
            if let Some(error) = outcome.error.as_deref() {
                tracing::warn!("❌ Login failed: {}", error);
            }
            println!("{}", sonic_rs::to_string(&outcome)?);
        }
        Command::Logout => session.logout().await,
    }

    println!("{}", sonic_rs::to_string(&session.snapshot())?);
    Ok(())
}
