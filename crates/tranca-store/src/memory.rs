//! In-process lease store
//!
//! `MemoryLeaseStore` keeps leases in a `DashMap`; the per-key entry
//! lock makes each conditional operation a single atomic step. Expired
//! records read as absent everywhere and are purged lazily on read, with
//! `purge_expired` available as a sweep.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use tranca_common::TrancaError;

use crate::lease::{LeaseRecord, OwnerToken};
use crate::store::LeaseStore;

/// In-memory lease store with TTL enforcement
#[derive(Default)]
pub struct MemoryLeaseStore {
    leases: DashMap<String, LeaseRecord>,
}

impl MemoryLeaseStore {
    pub fn new() -> Self {
        Self {
            leases: DashMap::new(),
        }
    }

    /// Number of lease records currently stored, expired ones included
    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }

    /// Sweep expired records, returning how many were removed
    ///
    /// Reads already treat expired records as absent; the sweep only
    /// reclaims memory.
    pub fn purge_expired(&self) -> usize {
        let before = self.leases.len();
        self.leases.retain(|_, lease| !lease.is_expired());
        before - self.leases.len()
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn acquire(
        &self,
        key: &str,
        token: &OwnerToken,
        ttl: Duration,
    ) -> Result<bool, TrancaError> {
        match self.leases.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is_expired() {
                    return Ok(false);
                }
                debug!(key, previous = %entry.get().token, "replacing expired lease");
                entry.insert(LeaseRecord::new(token.clone(), ttl));
                Ok(true)
            }
            Entry::Vacant(entry) => {
                entry.insert(LeaseRecord::new(token.clone(), ttl));
                Ok(true)
            }
        }
    }

    async fn release(&self, key: &str, token: &OwnerToken) -> Result<bool, TrancaError> {
        Ok(self
            .leases
            .remove_if(key, |_, lease| {
                !lease.is_expired() && lease.token == *token
            })
            .is_some())
    }

    async fn renew(
        &self,
        key: &str,
        token: &OwnerToken,
        ttl: Duration,
    ) -> Result<bool, TrancaError> {
        match self.leases.get_mut(key) {
            Some(mut lease) if !lease.is_expired() && lease.token == *token => {
                lease.extend(ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, TrancaError> {
        let lapsed = match self.leases.get(key) {
            Some(lease) => {
                if !lease.is_expired() {
                    return Ok(true);
                }
                true
            }
            None => false,
        };

        if lapsed {
            // Lazy expire: the record is logically gone already
            self.leases.remove_if(key, |_, lease| lease.is_expired());
        }
        Ok(false)
    }

    async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, TrancaError> {
        let remaining = match self.leases.get(key) {
            Some(lease) if !lease.is_expired() => return Ok(Some(lease.remaining_ttl())),
            Some(_) => None,
            None => return Ok(None),
        };

        self.leases.remove_if(key, |_, lease| lease.is_expired());
        Ok(remaining)
    }

    async fn force_release(&self, key: &str) -> Result<bool, TrancaError> {
        Ok(self.leases.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_then_contend() {
        let store = MemoryLeaseStore::new();
        let first = OwnerToken::mint();
        let second = OwnerToken::mint();

        assert!(
            store
                .acquire("k1", &first, Duration::from_secs(5))
                .await
                .unwrap()
        );
        assert!(
            !store
                .acquire("k1", &second, Duration::from_secs(5))
                .await
                .unwrap()
        );
        assert!(store.exists("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_lease_is_reacquirable() {
        let store = MemoryLeaseStore::new();
        let first = OwnerToken::mint();
        let second = OwnerToken::mint();

        assert!(
            store
                .acquire("k1", &first, Duration::from_millis(40))
                .await
                .unwrap()
        );
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(
            store
                .acquire("k1", &second, Duration::from_secs(5))
                .await
                .unwrap()
        );
        // the old owner's token no longer releases anything
        assert!(!store.release("k1", &first).await.unwrap());
        assert!(store.exists("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_release_requires_matching_token() {
        let store = MemoryLeaseStore::new();
        let owner = OwnerToken::mint();

        store
            .acquire("k1", &owner, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(
            !store
                .release("k1", &OwnerToken::from("wrong-token"))
                .await
                .unwrap()
        );
        assert!(store.exists("k1").await.unwrap());

        assert!(store.release("k1", &owner).await.unwrap());
        // second release with the now-stale token is a no-op
        assert!(!store.release("k1", &owner).await.unwrap());
    }

    #[tokio::test]
    async fn test_renew_extends_matching_lease_only() {
        let store = MemoryLeaseStore::new();
        let owner = OwnerToken::mint();

        store
            .acquire("k1", &owner, Duration::from_millis(60))
            .await
            .unwrap();

        assert!(
            !store
                .renew("k1", &OwnerToken::from("wrong-token"), Duration::from_secs(5))
                .await
                .unwrap()
        );
        assert!(
            store
                .renew("k1", &owner, Duration::from_secs(5))
                .await
                .unwrap()
        );

        let remaining = store.remaining_ttl("k1").await.unwrap().unwrap();
        assert!(remaining > Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_renew_rejected_after_expiry() {
        let store = MemoryLeaseStore::new();
        let owner = OwnerToken::mint();

        store
            .acquire("k1", &owner, Duration::from_millis(40))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(
            !store
                .renew("k1", &owner, Duration::from_secs(5))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_expired_lease_reads_as_absent() {
        let store = MemoryLeaseStore::new();
        let owner = OwnerToken::mint();

        store
            .acquire("k1", &owner, Duration::from_millis(40))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!store.exists("k1").await.unwrap());
        assert!(store.remaining_ttl("k1").await.unwrap().is_none());
        // lazily purged by the reads above
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_force_release_ignores_ownership() {
        let store = MemoryLeaseStore::new();
        let owner = OwnerToken::mint();

        store
            .acquire("k1", &owner, Duration::from_secs(300))
            .await
            .unwrap();

        assert!(store.force_release("k1").await.unwrap());
        assert!(!store.force_release("k1").await.unwrap());
        assert!(!store.exists("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired_sweeps_only_lapsed_leases() {
        let store = MemoryLeaseStore::new();

        store
            .acquire("short", &OwnerToken::mint(), Duration::from_millis(30))
            .await
            .unwrap();
        store
            .acquire("long", &OwnerToken::mint(), Duration::from_secs(300))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.exists("long").await.unwrap());
    }
}
