//! The counter store trait.

use async_trait::async_trait;

use crate::error::StoreError;

/// Networked integer store with atomic per-key reads and writes.
///
/// Implementations must tolerate concurrent access from many job handlers.
/// No transaction API is assumed beyond [`CounterStore::compare_and_set`].
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the integer stored under `key`.
    ///
    /// Returns `None` when the key is absent. A value that does not parse as an
    /// integer is reported as absent.
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Unconditionally write `value` under `key`.
    async fn set(&self, key: &str, value: i64) -> Result<(), StoreError>;

    /// Write `new` under `key` only if the current value equals `expected`
    /// (`None` meaning the key is absent).
    ///
    /// Returns `true` when the write happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<i64>,
        new: i64,
    ) -> Result<bool, StoreError>;
}
