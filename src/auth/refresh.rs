//! Access-token renewal with single-flight coalescing.
//!
//! When an access token expires, every in-flight request observes a 401 at
//! roughly the same time. Without coordination each of them would post the
//! refresh token to the server independently. The coordinator keeps a single
//! shared in-flight renewal: the first caller starts the exchange, later
//! callers attach to the same future, and all of them receive the outcome of
//! that one network call.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::TokenStore;

/// Bound on a single renewal round-trip. A hung refresh must not stall every
/// queued request behind it.
const REFRESH_TIMEOUT_SECS: u64 = 10;

/// Why a renewal failed. `Clone` because the outcome is fanned out to every
/// caller attached to the shared in-flight renewal.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// No refresh token in the store; nothing to renew with. The session is
    /// torn down without a network call.
    #[error("no refresh token stored")]
    MissingRefreshToken,

    /// The server refused the refresh token (expired or revoked), or returned
    /// a body we could not use. The session is torn down.
    #[error("refresh token rejected: {0}")]
    Rejected(String),

    /// The renewal request never got an answer (connect error, timeout). The
    /// refresh token may still be valid, so the store is left intact and a
    /// later request may try again.
    #[error("could not reach the auth server: {0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    /// The server may rotate the refresh token alongside the access token.
    #[serde(default)]
    refresh: Option<String>,
}

type SharedRenewal = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Coordinates access-token renewal against `POST {base}/auth/refresh/`.
/// Clone is cheap - the slot and HTTP pool are shared through an `Arc`.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    http: Client,
    refresh_url: String,
    store: TokenStore,
    timeout: Duration,
    in_flight: Mutex<Option<SharedRenewal>>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, base_url: &str, store: TokenStore) -> Self {
        Self::with_timeout(
            http,
            base_url,
            store,
            Duration::from_secs(REFRESH_TIMEOUT_SECS),
        )
    }

    /// Like `new`, with an explicit bound on the renewal round-trip.
    pub fn with_timeout(http: Client, base_url: &str, store: TokenStore, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                http,
                refresh_url: format!("{}/auth/refresh/", base_url.trim_end_matches('/')),
                store,
                timeout,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Exchange the stored refresh token for a fresh access token, writing it
    /// into the store and returning it. Concurrent callers share one in-flight
    /// exchange; each renewal issues at most one network call.
    pub async fn renew(&self) -> Result<String, RefreshError> {
        let renewal = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    debug!("attaching to in-flight token renewal");
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let fut = async move {
                        let outcome = inner.renew_once().await;
                        // Free the slot so the next expiry starts a fresh
                        // exchange; waiters already attached keep the cached
                        // outcome.
                        inner.in_flight.lock().await.take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };
        renewal.await
    }
}

impl CoordinatorInner {
    async fn renew_once(&self) -> Result<String, RefreshError> {
        let Some(refresh) = self.store.refresh() else {
            warn!("401 with no refresh token stored, tearing session down");
            self.teardown();
            return Err(RefreshError::MissingRefreshToken);
        };

        debug!("renewing access token");
        let response = self
            .http
            .post(&self.refresh_url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                // Can't tell whether the refresh token is still good, so keep
                // it for a later attempt.
                warn!(error = %err, "token renewal transport failure");
                return Err(RefreshError::Transport(err.to_string()));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "refresh token rejected by server");
            self.teardown();
            return Err(RefreshError::Rejected(format!("status {status}")));
        }

        let parsed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "unusable refresh response body");
                self.teardown();
                return Err(RefreshError::Rejected(err.to_string()));
            }
        };

        // The in-memory tokens are updated even if persisting to disk fails;
        // the renewed session just won't survive a restart.
        if let Err(err) = self.store.set(parsed.access.clone(), parsed.refresh) {
            warn!(error = %err, "failed to persist renewed tokens");
        }
        debug!("access token renewed");
        Ok(parsed.access)
    }

    fn teardown(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear token store");
        }
    }
}
