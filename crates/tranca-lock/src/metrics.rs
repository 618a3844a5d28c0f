// Metrics for the lock coordinator
// Counters for acquisition, release and renew outcomes

use metrics::{counter, describe_counter};

/// Initialize all metric descriptions
/// Should be called once at application startup
pub fn init_metrics() {
    describe_counter!(
        "lock_acquire_total",
        "Total number of lock acquisition attempts"
    );
    describe_counter!("lock_release_total", "Total number of lock release attempts");
    describe_counter!("lock_renew_total", "Total number of lock renew attempts");
    describe_counter!(
        "lock_force_release_total",
        "Total number of forced lock releases"
    );
}

/// Record a lock acquisition attempt
pub fn record_acquire(key: &str, outcome: &str) {
    counter!("lock_acquire_total", "key" => key.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a lock release attempt
pub fn record_release(key: &str, outcome: &str) {
    counter!("lock_release_total", "key" => key.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a lock renew attempt
pub fn record_renew(key: &str, outcome: &str) {
    counter!("lock_renew_total", "key" => key.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a forced release
pub fn record_force_release(key: &str) {
    counter!("lock_force_release_total", "key" => key.to_string()).increment(1);
}
