//! Static product catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Identifier of a catalog item.
pub type ItemId = u32;

/// A product that can be reserved. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: ItemId,
    pub item_name: String,
    pub price: f64,
    pub initial_available_quantity: u32,
}

impl Item {
    pub fn new(
        item_id: ItemId,
        item_name: impl Into<String>,
        price: f64,
        initial_available_quantity: u32,
    ) -> Self {
        Self {
            item_id,
            item_name: item_name.into(),
            price,
            initial_available_quantity,
        }
    }

    /// Capacity as a counter value.
    #[inline]
    pub fn capacity(&self) -> i64 {
        i64::from(self.initial_available_quantity)
    }
}

/// An item together with its current stock level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAvailability {
    #[serde(flatten)]
    pub item: Item,
    pub current_quantity: i64,
}

/// The products shipped when no catalog is configured.
pub fn default_products() -> Vec<Item> {
    vec![
        Item::new(1, "Suitcase 250", 50.0, 4),
        Item::new(2, "Suitcase 450", 100.0, 10),
        Item::new(3, "Suitcase 650", 350.0, 2),
        Item::new(4, "Suitcase 1050", 550.0, 5),
    ]
}

/// Parse an item id coming from a request path. Ids start at 1.
///
/// An all-digit id beyond the id range is well formed but cannot exist, so it
/// is reported as not found rather than invalid.
pub fn parse_item_id(raw: &str) -> Result<ItemId, InventoryError> {
    let trimmed = raw.trim();
    match trimmed.parse::<ItemId>() {
        Ok(0) => Err(InventoryError::InvalidInput(format!(
            "invalid product id: {raw}"
        ))),
        Ok(id) => Ok(id),
        Err(_) if is_positive_number(trimmed) => {
            Err(InventoryError::UnknownProductId(trimmed.to_owned()))
        }
        Err(_) => Err(InventoryError::InvalidInput(format!(
            "invalid product id: {raw}"
        ))),
    }
}

#[inline]
fn is_positive_number(raw: &str) -> bool {
    !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && raw.bytes().any(|b| b != b'0')
}

/// Immutable list of reservable items.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: default_products(),
        }
    }
}

impl Catalog {
    /// Build a catalog, rejecting duplicate or zero ids.
    pub fn new(items: Vec<Item>) -> Result<Self, InventoryError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.item_id == 0 {
                return Err(InventoryError::InvalidInput(
                    "item ids must be positive".into(),
                ));
            }
            if !seen.insert(item.item_id) {
                return Err(InventoryError::InvalidInput(format!(
                    "duplicate item id: {}",
                    item.item_id
                )));
            }
        }
        Ok(Self { items })
    }

    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, item_id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    /// Like [`Catalog::get`] but reports a missing item as an error.
    pub fn require(&self, item_id: ItemId) -> Result<&Item, InventoryError> {
        self.get(item_id)
            .ok_or(InventoryError::ProductNotFound(item_id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
