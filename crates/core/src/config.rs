//! Environment-driven configuration.
//!
//! Every knob has a default; a variable that is set but unparsable is logged
//! at warn level and ignored.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "IA_DB_PATH";
pub const ENV_DB_POOL_SIZE: &str = "IA_DB_POOL_SIZE";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "IA_DB_BUSY_TIMEOUT_MS";
pub const ENV_DB_POOL_TIMEOUT_SECS: &str = "IA_DB_POOL_TIMEOUT_SECS";
pub const ENV_STORE_MAX_ATTEMPTS: &str = "IA_STORE_MAX_ATTEMPTS";
pub const ENV_STORE_RETRY_BASE_MS: &str = "IA_STORE_RETRY_BASE_MS";

/// Parse an environment variable, falling back to `default` when it is unset
/// or invalid. Invalid values are reported with `tracing::warn!`.
pub fn env_parse_with_default<T: FromStr + Display>(var: &str, default: T) -> T {
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
            default
        },
    }
}

/// Database path from `IA_DB_PATH`, if set and non-empty.
#[must_use]
pub fn db_path_from_env() -> Option<PathBuf> {
    std::env::var_os(ENV_DB_PATH).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Connection settings for the SQLite store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Pooled connections. One writer is enough; extra connections serve readers.
    pub pool_size: u32,
    /// How long SQLite waits on a locked database before reporting BUSY.
    pub busy_timeout: Duration,
    /// How long to wait for a free pooled connection.
    pub pool_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            busy_timeout: Duration::from_millis(5000),
            pool_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pool_size: env_parse_with_default(ENV_DB_POOL_SIZE, defaults.pool_size).max(1),
            busy_timeout: Duration::from_millis(env_parse_with_default(
                ENV_DB_BUSY_TIMEOUT_MS,
                defaults.busy_timeout.as_millis() as u64,
            )),
            pool_timeout: Duration::from_secs(env_parse_with_default(
                ENV_DB_POOL_TIMEOUT_SECS,
                defaults.pool_timeout.as_secs(),
            )),
        }
    }
}

/// Bounded exponential backoff for transient store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each later attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, base_delay: Duration::from_millis(100) }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self { max_attempts: 1, base_delay: Duration::ZERO }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_parse_with_default(ENV_STORE_MAX_ATTEMPTS, defaults.max_attempts)
                .max(1),
            base_delay: Duration::from_millis(env_parse_with_default(
                ENV_STORE_RETRY_BASE_MS,
                defaults.base_delay.as_millis() as u64,
            )),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // SAFETY (all tests below): each test touches its own variable name, so no
    // other thread reads or writes it concurrently.

    #[test]
    fn test_env_parse_valid_value() {
        let var = "IA_TEST_ENV_PARSE_VALID_41127";
        unsafe { std::env::set_var(var, " 42 ") };
        let result: u32 = env_parse_with_default(var, 10);
        assert_eq!(result, 42);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var = "IA_TEST_ENV_PARSE_INVALID_41128";
        unsafe { std::env::set_var(var, "lots") };
        let result: u32 = env_parse_with_default(var, 10);
        assert_eq!(result, 10);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_missing_var() {
        let result: u64 = env_parse_with_default("IA_TEST_ENV_PARSE_MISSING_41129", 7);
        assert_eq!(result, 7);
    }

    #[test]
    fn test_retry_delays_double() {
        let policy = RetryPolicy { max_attempts: 4, base_delay: Duration::from_millis(50) };
        assert_eq!(policy.delay_after(1), Duration::from_millis(50));
        assert_eq!(policy.delay_after(2), Duration::from_millis(100));
        assert_eq!(policy.delay_after(3), Duration::from_millis(200));
    }

    #[test]
    fn test_retry_delay_saturates() {
        let policy = RetryPolicy { max_attempts: 100, base_delay: Duration::from_secs(1) };
        assert!(policy.delay_after(90) >= policy.delay_after(32));
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_after(1), Duration::ZERO);
    }
}
