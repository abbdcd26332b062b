//! Bounded exponential backoff around store operations.

use ia_core::config::RetryPolicy;
use ia_storage::StorageError;

use crate::ServiceError;

/// Run `op` until it succeeds, fails with a non-transient error, or
/// `policy.max_attempts` attempts have been made.
///
/// Sleeps `policy.delay_after(n)` between attempts. Fatal errors are returned
/// as [`ServiceError::Storage`] on first sight; transient errors that outlast
/// the policy become [`ServiceError::RetriesExhausted`].
pub fn with_retry<T>(
    policy: RetryPolicy,
    operation: &str,
    mut op: impl FnMut() -> Result<T, StorageError>,
) -> Result<T, ServiceError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(ServiceError::Storage(e)),
            Err(e) if attempt >= max_attempts => {
                return Err(ServiceError::RetriesExhausted {
                    operation: operation.to_owned(),
                    attempts: attempt,
                    source: e,
                });
            },
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient storage error, retrying"
                );
                std::thread::sleep(delay);
                attempt += 1;
            },
        }
    }
}
