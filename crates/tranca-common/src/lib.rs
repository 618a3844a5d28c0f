//! Tranca Common - shared error types and utilities
//!
//! This crate provides the foundational pieces used across the Tranca
//! components:
//! - Error taxonomy
//! - Key validation
//! - Duration parsing and unix-time helpers

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::TrancaError;
pub use utils::{current_unix_millis, is_valid_key, parse_duration};
