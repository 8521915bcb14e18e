//! Shared counter store used by the StockHub ledgers.
//!
//! The ledgers only need a networked key/value service that can read and write
//! integers per key. [`CounterStore`] captures that surface, plus a
//! compare-and-set primitive so commits can be made atomic without a
//! transaction API.
//!
//! # Implementations
//!
//! - [`MemoryCounterStore`] - in-process store backed by a `DashMap`
//! - [`RedisCounterStore`] - Redis store using a connection manager and a Lua
//!   script for compare-and-set
//!
//! # Example
//!
//! ```rust,no_run
//! use stockhub_counter_store::{CounterStore, MemoryCounterStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryCounterStore::new();
//!     store.set("available_seats", 50).await.unwrap();
//!     assert_eq!(store.get("available_seats").await.unwrap(), Some(50));
//! }
//! ```

mod error;
mod memory;
mod redis_store;
mod store;

pub use error::StoreError;
pub use memory::MemoryCounterStore;
pub use redis_store::RedisCounterStore;
pub use store::CounterStore;

// Re-export async_trait for convenience when implementing CounterStore
pub use async_trait::async_trait;
