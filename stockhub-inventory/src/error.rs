//! Inventory errors.

use stockhub_counter_store::StoreError;
use thiserror::Error;

use crate::catalog::ItemId;

/// Errors raised by the catalog and the ledgers.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    #[error("product not found: {0}")]
    ProductNotFound(ItemId),

    /// A numeric id too large to name any catalog item.
    #[error("product not found: {0}")]
    UnknownProductId(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("gave up committing {key} after repeated concurrent updates")]
    Contended { key: String },
}
