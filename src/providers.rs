//! Shared provider traits for dependency injection.
//!
//! This module contains common traits used across the codebase to enable
//! testability through dependency injection. By abstracting external
//! dependencies behind traits, modules can be tested in isolation with
//! mock implementations.

/// Trait for providing timestamps.
///
/// Repository names embed the current timestamp, so tests inject a fixed
/// clock to get a predictable name prefix.
///
/// # Example
///
/// ```
/// use fabrica::providers::{TimeProvider, SystemTimeProvider};
///
/// let provider = SystemTimeProvider;
/// let timestamp = provider.now();
/// assert!(timestamp > 0);
/// ```
pub trait TimeProvider: Send + Sync {
    /// Returns the current Unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// Default time provider using system time.
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Time provider that always returns the same instant.
pub struct FixedTimeProvider(pub u64);

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> u64 {
        self.0
    }
}
