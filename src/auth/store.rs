//! Durable storage for the access/refresh token pair.
//!
//! The store is the only shared mutable state in the crate. It is a cheap
//! cloneable handle (the inner state sits behind an `Arc`) so the API client,
//! the refresh coordinator, and the session bootstrapper all observe the same
//! tokens. Writes replace, never append: at most one access token and one
//! refresh token exist at any time.
//!
//! Persistence is a small JSON file under the application data directory with
//! the two fixed keys `access` and `refresh`; absence of the file means "no
//! session". Tests use `TokenStore::in_memory()` instead.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token file name in the data directory
const TOKENS_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

struct Inner {
    /// Absent for in-memory stores (tests)
    path: Option<PathBuf>,
    tokens: RwLock<StoredTokens>,
}

#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

impl TokenStore {
    /// Open the store backed by `tokens.json` in the given data directory,
    /// loading any tokens persisted by a previous run.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(TOKENS_FILE);
        let tokens = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read token file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse token file {}", path.display()))?
        } else {
            StoredTokens::default()
        };

        Ok(Self {
            inner: Arc::new(Inner {
                path: Some(path),
                tokens: RwLock::new(tokens),
            }),
        })
    }

    /// Create a store with no persistence. Used by tests as the fake
    /// counterpart of `open`.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                path: None,
                tokens: RwLock::new(StoredTokens::default()),
            }),
        }
    }

    /// Current access token, if a session exists.
    pub fn access(&self) -> Option<String> {
        self.read().access.clone()
    }

    /// Current refresh token, if one was issued.
    pub fn refresh(&self) -> Option<String> {
        self.read().refresh.clone()
    }

    /// True if an access token is stored. The token may still be expired;
    /// only the server can tell.
    pub fn has_session(&self) -> bool {
        self.read().access.is_some()
    }

    /// Replace the access token. A `Some` refresh token replaces the stored
    /// one; `None` keeps whatever refresh token is already there, so renewals
    /// that only rotate the access token leave the refresh token intact.
    pub fn set(&self, access: String, refresh: Option<String>) -> Result<()> {
        let snapshot = {
            let mut tokens = self.write();
            tokens.access = Some(access);
            if let Some(refresh) = refresh {
                tokens.refresh = Some(refresh);
            }
            tokens.clone()
        };
        self.persist(&snapshot)
    }

    /// Drop both tokens and delete the persisted file.
    pub fn clear(&self) -> Result<()> {
        {
            let mut tokens = self.write();
            *tokens = StoredTokens::default();
        }
        if let Some(ref path) = self.inner.path {
            if path.exists() {
                std::fs::remove_file(path)
                    .with_context(|| format!("Failed to remove token file {}", path.display()))?;
            }
        }
        debug!("token store cleared");
        Ok(())
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        let Some(ref path) = self.inner.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write token file {}", path.display()))?;
        Ok(())
    }

    // Poisoning only happens if a writer panicked mid-update; the data is a
    // plain token pair, so recover the guard rather than propagate the panic.
    fn read(&self) -> RwLockReadGuard<'_, StoredTokens> {
        self.inner
            .tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredTokens> {
        self.inner
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
