//! Error types for Tranca
//!
//! `TrancaError` covers the failure classes of the locking core. Note
//! that a release or renew attempt with a stale token is not an error:
//! it is an expected outcome under expiry races and is reported as a
//! boolean `false` by the operations themselves.

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum TrancaError {
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}
