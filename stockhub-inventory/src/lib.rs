//! Inventory ledgers for StockHub.
//!
//! Two ledgers share the same counter store but track opposite quantities:
//!
//! - [`StockLedger`] counts *reserved* units per catalog item under `item.<id>`
//!   (counts up from 0).
//! - [`SeatLedger`] counts *remaining* seats under `available_seats` (counts
//!   down to 0).
//!
//! Both expose the plain read/write operations and an atomic commit built on
//! [`CounterStore::compare_and_set`](stockhub_counter_store::CounterStore::compare_and_set).

mod catalog;
mod error;
mod seats;
mod stock;

pub use catalog::{default_products, parse_item_id, Catalog, Item, ItemId, ProductAvailability};
pub use error::InventoryError;
pub use seats::{SeatLedger, SEATS_KEY};
pub use stock::StockLedger;

/// Maximum compare-and-set attempts before a commit gives up.
pub(crate) const MAX_COMMIT_ATTEMPTS: usize = 32;

/// Result of an atomic commit against a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// One unit was committed; `remaining` units are left afterwards.
    Committed { remaining: i64 },
    /// Nothing was left to commit.
    Exhausted,
}

impl CommitOutcome {
    /// True when this commit took the last available unit.
    #[inline]
    pub const fn exhausted_stock(self) -> bool {
        matches!(self, Self::Committed { remaining: 0 })
    }
}
