use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::Result;

/// The fixed key the session token is stored under.
pub const TOKEN_KEY: &str = "jwt_token";

/// Persistent storage for the single session token.
///
/// A value is either fully present or absent; it is replaced or removed,
/// never edited in place.
pub trait TokenStore: Send + Sync {
    /// Reads the stored token, if any.
    fn get(&self) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Replaces the stored token.
    fn set(&self, token: &str) -> impl Future<Output = Result<()>> + Send;

    /// Removes the stored token. Succeeds when nothing is stored.
    fn clear(&self) -> impl Future<Output = Result<()>> + Send;
}

/// A token store backed by a file named after `TOKEN_KEY` in a directory.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a new `FileTokenStore` rooted at `dir`.
    ///
    /// The directory is created on the first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    /// The file the token lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

impl TokenStore for FileTokenStore {
    async fn get(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let staging = self.staging_path();
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&staging).await?;
        file.write_all(token.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&staging, &self.path).await?;
        tracing::debug!("💾 Token written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!("🧹 Token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An in-process token store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    /// Creates a new, empty `MemoryTokenStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.slot.read().await.clone())
    }

    async fn set(&self, token: &str) -> Result<()> {
        *self.slot.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// The store used when no persistence is available. Holds nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTokenStore;

impl TokenStore for NoopTokenStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
