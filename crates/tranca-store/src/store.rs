//! The `LeaseStore` contract
//!
//! Every conditional method is a single atomic step at the store. A
//! separate read-then-mutate sequence is unsound here: the lease can
//! expire or be reacquired by another owner between the two steps, which
//! is exactly the race the conditional operations close.

use std::time::Duration;

use async_trait::async_trait;

use tranca_common::TrancaError;

use crate::lease::OwnerToken;

/// Atomic lease operations over a shared key-value store
///
/// Implementations own the clock that decides expiry; an expired lease
/// must behave as if it were absent in every method.
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Set `key` -> `token` with the given TTL iff no unexpired lease
    /// exists. Returns `true` iff this call created the lease.
    async fn acquire(
        &self,
        key: &str,
        token: &OwnerToken,
        ttl: Duration,
    ) -> Result<bool, TrancaError>;

    /// Delete the lease on `key` iff its stored token equals `token`.
    /// Returns `false` on any mismatch, leaving the store untouched.
    async fn release(&self, key: &str, token: &OwnerToken) -> Result<bool, TrancaError>;

    /// Reset the lease TTL iff the stored token equals `token`.
    async fn renew(
        &self,
        key: &str,
        token: &OwnerToken,
        ttl: Duration,
    ) -> Result<bool, TrancaError>;

    /// Whether an unexpired lease exists on `key`
    async fn exists(&self, key: &str) -> Result<bool, TrancaError>;

    /// Remaining TTL of the lease on `key`, `None` when no unexpired
    /// lease exists
    async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, TrancaError>;

    /// Unconditionally delete the lease on `key`, bypassing the
    /// ownership check
    ///
    /// Administrative escape hatch for stuck leases. Not reachable from
    /// the normal acquire/release flow.
    async fn force_release(&self, key: &str) -> Result<bool, TrancaError>;
}
