//! Scoped lease release
//!
//! `LockGuard` ties a held lease to a scope: release it explicitly to
//! observe the outcome, or let the drop backstop issue a best-effort
//! release. TTL expiry remains the final cleanup when neither runs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use tranca_store::{LeaseStore, OwnerToken};

/// A held lease bound to a scope
///
/// Obtained from [`crate::LockManager::acquire_scoped`]. Dropping the
/// guard without calling [`LockGuard::release`] spawns a best-effort
/// release; outside a Tokio runtime the lease simply lapses via TTL.
pub struct LockGuard<S: LeaseStore + ?Sized + 'static> {
    store: Arc<S>,
    key: String,
    token: OwnerToken,
    released: bool,
}

impl<S: LeaseStore + ?Sized + 'static> LockGuard<S> {
    pub(crate) fn new(store: Arc<S>, key: String, token: OwnerToken) -> Self {
        Self {
            store,
            key,
            token,
            released: false,
        }
    }

    /// The full store key the lease is held under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The owner token proving this acquisition
    pub fn token(&self) -> &OwnerToken {
        &self.token
    }

    /// Extend the lease TTL
    ///
    /// `false` means ownership was lost (the lease expired and may have
    /// been reacquired, or the store could not be reached); the caller
    /// must treat the critical section as no longer protected and abort.
    pub async fn renew(&self, ttl: Duration) -> bool {
        match self.store.renew(&self.key, &self.token, ttl).await {
            Ok(renewed) => renewed,
            Err(e) => {
                warn!(key = %self.key, error = %e, "lease renew failed");
                false
            }
        }
    }

    /// Release the lease
    ///
    /// Returns `false` when the lease was already gone or owned by
    /// someone else. Store failures are logged, not raised; the lease
    /// then lapses via TTL.
    pub async fn release(mut self) -> bool {
        self.released = true;
        match self.store.release(&self.key, &self.token).await {
            Ok(released) => {
                debug!(key = %self.key, released, "lease released");
                released
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "lease release failed; lease will lapse via ttl");
                false
            }
        }
    }
}

impl<S: LeaseStore + ?Sized + 'static> Drop for LockGuard<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Without a runtime there is nowhere to run the release; the
        // lease lapses via TTL instead.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let store = self.store.clone();
        let key = std::mem::take(&mut self.key);
        let token = self.token.clone();
        handle.spawn(async move {
            match store.release(&key, &token).await {
                Ok(released) => debug!(key = %key, released, "lease released on drop"),
                Err(e) => {
                    debug!(key = %key, error = %e, "release on drop failed; lease will lapse via ttl")
                }
            }
        });
    }
}
