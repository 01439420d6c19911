//! Admin token cache with single-flight refresh

use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// A bearer token and the instant it stops being accepted
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Build a session from a token-endpoint `expires_in` value
    pub fn from_expires_in(access_token: String, expires_in: i64) -> Result<Self> {
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| AppError::Auth(format!("invalid expires_in {}", expires_in)))?;

        Ok(Self {
            access_token,
            expires_at,
        })
    }

    /// Usable at `now` only if it outlives the safety margin
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at > now + margin
    }
}

/// Caches the current admin session.
///
/// Reads are lock-free with respect to each other. Refreshes are serialised
/// through `refresh_lock` and the cache is re-checked once the lock is held,
/// so concurrent callers that all see an expired token cause one fetch.
pub struct TokenCache {
    session: RwLock<Option<AdminSession>>,
    refresh_lock: Mutex<()>,
    margin: Duration,
}

impl TokenCache {
    pub fn new(margin_secs: i64) -> Self {
        Self {
            session: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            margin: Duration::seconds(margin_secs),
        }
    }

    /// Return a valid token, calling `fetch` first if the cached one is
    /// missing or about to expire.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AdminSession>>,
    {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        debug!("Admin token missing or expired, refreshing");
        let session = fetch().await?;
        let token = session.access_token.clone();
        *self.session.write().await = Some(session);

        Ok(token)
    }

    /// Replace the cached session
    pub async fn store(&self, session: AdminSession) {
        *self.session.write().await = Some(session);
    }

    /// Drop the cached session so the next call re-authenticates
    pub async fn invalidate(&self) {
        *self.session.write().await = None;
    }

    async fn cached(&self) -> Option<String> {
        let session = self.session.read().await;
        session
            .as_ref()
            .filter(|s| s.is_valid_at(Utc::now(), self.margin))
            .map(|s| s.access_token.clone())
    }
}
