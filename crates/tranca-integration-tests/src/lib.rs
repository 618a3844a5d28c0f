//! Test utilities for the Tranca integration suite

use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;

use tranca_common::TrancaError;
use tranca_lock::{LockManager, LockSettings};
use tranca_store::{LeaseStore, MemoryLeaseStore, OwnerToken};

static TRACING: Once = Once::new();

/// Install a tracing subscriber and metric descriptions once for the
/// whole test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        tranca_lock::metrics::init_metrics();
    });
}

/// A coordinator over a fresh in-memory store
pub fn test_manager() -> LockManager<MemoryLeaseStore> {
    init_tracing();
    LockManager::with_defaults(Arc::new(MemoryLeaseStore::new()))
}

/// A coordinator with explicit settings over a fresh in-memory store
pub fn test_manager_with(settings: LockSettings) -> LockManager<MemoryLeaseStore> {
    init_tracing();
    LockManager::new(Arc::new(MemoryLeaseStore::new()), settings).expect("valid test settings")
}

/// A store that refuses every call, for fail-closed scenarios
pub struct UnavailableLeaseStore;

impl UnavailableLeaseStore {
    fn offline<T>() -> Result<T, TrancaError> {
        Err(TrancaError::StoreUnavailable("store offline".to_string()))
    }
}

#[async_trait]
impl LeaseStore for UnavailableLeaseStore {
    async fn acquire(
        &self,
        _key: &str,
        _token: &OwnerToken,
        _ttl: Duration,
    ) -> Result<bool, TrancaError> {
        Self::offline()
    }

    async fn release(&self, _key: &str, _token: &OwnerToken) -> Result<bool, TrancaError> {
        Self::offline()
    }

    async fn renew(
        &self,
        _key: &str,
        _token: &OwnerToken,
        _ttl: Duration,
    ) -> Result<bool, TrancaError> {
        Self::offline()
    }

    async fn exists(&self, _key: &str) -> Result<bool, TrancaError> {
        Self::offline()
    }

    async fn remaining_ttl(&self, _key: &str) -> Result<Option<Duration>, TrancaError> {
        Self::offline()
    }

    async fn force_release(&self, _key: &str) -> Result<bool, TrancaError> {
        Self::offline()
    }
}
