//! Lock coordinator
//!
//! `LockManager` is the public API of the lock core. Acquisition is a
//! single non-blocking probe against the store; polling, backoff and
//! queueing are the caller's business. A store failure during
//! acquisition is treated as "not acquired", never as success.
//!
//! A lease protects its critical section only as long as its TTL. There
//! is no automatic renewal: callers whose sections may outlive the TTL
//! must call [`LockManager::renew`] (or [`LockGuard::renew`]) and
//! abandon the section when it returns `false`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use tranca_common::{TrancaError, is_valid_key};
use tranca_store::{LeaseStore, OwnerToken};

use crate::guard::LockGuard;
use crate::metrics;
use crate::settings::LockSettings;

/// Coordinator for lease-based mutual exclusion over a [`LeaseStore`]
pub struct LockManager<S: LeaseStore + ?Sized> {
    store: Arc<S>,
    settings: LockSettings,
}

// Manual Clone implementation to avoid requiring S: Clone
impl<S: LeaseStore + ?Sized> Clone for LockManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

impl<S: LeaseStore + ?Sized + 'static> LockManager<S> {
    /// Create a coordinator over `store` with validated settings
    pub fn new(store: Arc<S>, settings: LockSettings) -> Result<Self, TrancaError> {
        settings.validate()?;
        Ok(Self { store, settings })
    }

    /// Coordinator with default settings
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self {
            store,
            settings: LockSettings::default(),
        }
    }

    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.settings.key_prefix, key)
    }

    fn check_key(key: &str) -> Result<(), TrancaError> {
        if !is_valid_key(key) {
            return Err(TrancaError::IllegalArgument(format!(
                "invalid lock key '{key}'"
            )));
        }
        Ok(())
    }

    fn effective_ttl(&self, ttl: Option<Duration>) -> Result<Duration, TrancaError> {
        let ttl = ttl.unwrap_or_else(|| self.settings.default_ttl());
        if ttl.is_zero() {
            return Err(TrancaError::IllegalArgument(
                "ttl must be positive".to_string(),
            ));
        }
        Ok(ttl)
    }

    /// Try to acquire the lock once, minting a fresh owner token
    ///
    /// `None` means the lock is held by someone else, or the store could
    /// not confirm ownership; both are "not acquired". `ttl = None`
    /// applies the configured default.
    pub async fn try_acquire(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<Option<OwnerToken>, TrancaError> {
        let token = OwnerToken::mint();
        let acquired = self.try_acquire_with_token(key, &token, ttl).await?;
        Ok(acquired.then_some(token))
    }

    /// Caller-supplied-token variant of [`LockManager::try_acquire`]
    ///
    /// Useful when the token carries external meaning, such as a
    /// request id, or for deterministic tests.
    pub async fn try_acquire_with_token(
        &self,
        key: &str,
        token: &OwnerToken,
        ttl: Option<Duration>,
    ) -> Result<bool, TrancaError> {
        Self::check_key(key)?;
        let ttl = self.effective_ttl(ttl)?;
        let full_key = self.full_key(key);

        match self.store.acquire(&full_key, token, ttl).await {
            Ok(true) => {
                debug!(key = %full_key, token = %token, ttl_ms = ttl.as_millis() as u64, "lock acquired");
                metrics::record_acquire(key, "acquired");
                Ok(true)
            }
            Ok(false) => {
                debug!(key = %full_key, "lock held, acquisition rejected");
                metrics::record_acquire(key, "contended");
                Ok(false)
            }
            Err(e) => {
                // Fail closed: unconfirmed ownership is no ownership
                warn!(key = %full_key, error = %e, "store error during acquisition, treating as not acquired");
                metrics::record_acquire(key, "error");
                Ok(false)
            }
        }
    }

    /// Release the lock iff `token` still owns it
    ///
    /// Never raises: a stale token, an expired lease, an invalid key and
    /// a store failure all come back `false`, so a housekeeping problem
    /// cannot mask the critical section's own outcome.
    pub async fn release(&self, key: &str, token: &OwnerToken) -> bool {
        if !is_valid_key(key) {
            warn!(key, "release with invalid key");
            return false;
        }
        let full_key = self.full_key(key);

        match self.store.release(&full_key, token).await {
            Ok(true) => {
                debug!(key = %full_key, token = %token, "lock released");
                metrics::record_release(key, "released");
                true
            }
            Ok(false) => {
                debug!(key = %full_key, token = %token, "release rejected, token no longer owns the lease");
                metrics::record_release(key, "not_owner");
                false
            }
            Err(e) => {
                warn!(key = %full_key, error = %e, "store error during release; lease will lapse via ttl");
                metrics::record_release(key, "error");
                false
            }
        }
    }

    /// Reset the lease TTL iff `token` still owns it
    ///
    /// Same never-raises contract as [`LockManager::release`]. A `false`
    /// return means ownership is lost; the caller must treat the
    /// critical section as unprotected.
    pub async fn renew(&self, key: &str, token: &OwnerToken, ttl: Option<Duration>) -> bool {
        if !is_valid_key(key) {
            warn!(key, "renew with invalid key");
            return false;
        }
        let ttl = match self.effective_ttl(ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!(key, error = %e, "renew with invalid ttl");
                return false;
            }
        };
        let full_key = self.full_key(key);

        match self.store.renew(&full_key, token, ttl).await {
            Ok(renewed) => {
                debug!(key = %full_key, renewed, "lock renew");
                metrics::record_renew(key, if renewed { "renewed" } else { "not_owner" });
                renewed
            }
            Err(e) => {
                warn!(key = %full_key, error = %e, "store error during renew");
                metrics::record_renew(key, "error");
                false
            }
        }
    }

    /// Whether an unexpired lease exists on `key`
    pub async fn exists(&self, key: &str) -> Result<bool, TrancaError> {
        Self::check_key(key)?;
        self.store.exists(&self.full_key(key)).await
    }

    /// Remaining TTL on `key`, `None` when no unexpired lease exists
    pub async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, TrancaError> {
        Self::check_key(key)?;
        self.store.remaining_ttl(&self.full_key(key)).await
    }

    /// Unconditionally delete the lease on `key`, bypassing ownership
    ///
    /// Administrative recovery for stuck locks. Always logged, never
    /// invoked from the acquire/release path.
    pub async fn force_release(&self, key: &str) -> Result<bool, TrancaError> {
        Self::check_key(key)?;
        let full_key = self.full_key(key);

        let removed = self.store.force_release(&full_key).await?;
        warn!(key = %full_key, removed, "lock forcibly released");
        metrics::record_force_release(key);
        Ok(removed)
    }

    /// Acquire the lock and wrap the lease in a [`LockGuard`]
    pub async fn acquire_scoped(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<Option<LockGuard<S>>, TrancaError> {
        let Some(token) = self.try_acquire(key, ttl).await? else {
            return Ok(None);
        };
        Ok(Some(LockGuard::new(
            self.store.clone(),
            self.full_key(key),
            token,
        )))
    }

    /// Run `task` under the lock
    ///
    /// Returns `Ok(None)` without running `task` when the lock is not
    /// acquired. On success the lease is released before returning, on
    /// every exit path: a task error is propagated after release, and a
    /// panic falls back to the guard's drop backstop.
    pub async fn execute_with_lock<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        task: F,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<TrancaError>,
    {
        let Some(guard) = self.acquire_scoped(key, ttl).await.map_err(E::from)? else {
            return Ok(None);
        };

        let result = task().await;
        // The critical section's outcome wins; release trouble is
        // logged inside the guard and left to TTL expiry.
        guard.release().await;
        result.map(Some)
    }
}
