//! Lease data model
//!
//! A lease pairs a lock key with the owner token that proves ownership,
//! bounded by an absolute expiry timestamp. Timestamps are unix
//! milliseconds read from the store's own clock, which is authoritative
//! for expiry.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tranca_common::current_unix_millis;

/// Opaque proof of lease ownership
///
/// Minted fresh for every acquisition attempt and required for release
/// and renew. Tokens are never reused across attempts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerToken(String);

impl OwnerToken {
    /// Mint a fresh random token
    pub fn mint() -> Self {
        OwnerToken(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OwnerToken {
    fn from(value: String) -> Self {
        OwnerToken(value)
    }
}

impl From<&str> for OwnerToken {
    fn from(value: &str) -> Self {
        OwnerToken(value.to_string())
    }
}

impl Display for OwnerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lease record as stored against a lock key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub token: OwnerToken,
    pub acquired_at_unix_ms: u64,
    pub expires_at_unix_ms: u64,
}

impl LeaseRecord {
    pub fn new(token: OwnerToken, ttl: Duration) -> Self {
        let now = current_unix_millis();
        LeaseRecord {
            token,
            acquired_at_unix_ms: now,
            expires_at_unix_ms: now.saturating_add(ttl.as_millis() as u64),
        }
    }

    pub fn is_expired(&self) -> bool {
        current_unix_millis() >= self.expires_at_unix_ms
    }

    /// Remaining time until passive expiry, zero if already expired
    pub fn remaining_ttl(&self) -> Duration {
        Duration::from_millis(self.expires_at_unix_ms.saturating_sub(current_unix_millis()))
    }

    /// Reset the expiry to `ttl` from now. The acquisition timestamp is
    /// unchanged.
    pub fn extend(&mut self, ttl: Duration) {
        self.expires_at_unix_ms = current_unix_millis().saturating_add(ttl.as_millis() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_tokens_are_unique() {
        let mut tokens = Vec::new();
        for _ in 0..10 {
            tokens.push(OwnerToken::mint());
        }

        let mut deduped = tokens.clone();
        deduped.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        deduped.dedup();
        assert_eq!(tokens.len(), deduped.len());
    }

    #[test]
    fn test_fresh_lease_is_not_expired() {
        let lease = LeaseRecord::new(OwnerToken::mint(), Duration::from_secs(30));
        assert!(!lease.is_expired());
        assert!(lease.remaining_ttl() > Duration::from_secs(29));
    }

    #[test]
    fn test_past_lease_is_expired() {
        let mut lease = LeaseRecord::new(OwnerToken::mint(), Duration::from_secs(30));
        lease.expires_at_unix_ms = current_unix_millis().saturating_sub(1000);
        assert!(lease.is_expired());
        assert_eq!(lease.remaining_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_extend_resets_expiry() {
        let mut lease = LeaseRecord::new(OwnerToken::mint(), Duration::from_millis(50));
        let acquired_at = lease.acquired_at_unix_ms;

        lease.extend(Duration::from_secs(60));
        assert!(lease.remaining_ttl() > Duration::from_secs(59));
        assert_eq!(lease.acquired_at_unix_ms, acquired_at);
    }
}
