//! The cart engine.
//!
//! A [`Cart`] is an insertion-ordered list of line items keyed by product id. These functions are pure: they mutate
//! the in-memory cart only. Loading and persisting carts (with optimistic version checks) is the job of
//! [`crate::CartApi`].
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::db_types::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Quantity must be at least 1, but was {0}")]
    InvalidQuantity(i64),
    #[error("{0} is not in the cart")]
    ItemNotFound(ProductId),
    #[error("The quantity for {0} is too large")]
    QuantityOverflow(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub qty: i64,
}

impl CartItem {
    pub fn new(product_id: ProductId, qty: i64) -> Self {
        Self { product_id, qty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter. Bumped by the store on every successful save.
    #[serde(skip)]
    pub version: i64,
}

impl Default for Cart {
    fn default() -> Self {
        Self { items: vec![], updated_at: Utc::now(), version: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QtyAction {
    #[serde(rename = "increment", alias = "inc")]
    Increment,
    #[serde(rename = "decrement", alias = "dec")]
    Decrement,
}

impl FromStr for QtyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inc" | "increment" => Ok(Self::Increment),
            "dec" | "decrement" => Ok(Self::Decrement),
            s => Err(format!("Unknown cart action: {s}")),
        }
    }
}

impl Cart {
    pub fn new(items: Vec<CartItem>, updated_at: DateTime<Utc>, version: i64) -> Self {
        Self { items, updated_at, version }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Adds `qty` units of the product. An existing line is increased rather than duplicated.
    pub fn add_item(&mut self, product_id: ProductId, qty: i64) -> Result<(), CartError> {
        if qty < 1 {
            return Err(CartError::InvalidQuantity(qty));
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.qty = item.qty.checked_add(qty).ok_or(CartError::QuantityOverflow(product_id))?;
            },
            None => self.items.push(CartItem::new(product_id, qty)),
        }
        self.touch();
        Ok(())
    }

    /// Steps the quantity of an existing line by one. A line that drops to zero is removed.
    pub fn adjust_qty(&mut self, product_id: ProductId, action: QtyAction) -> Result<(), CartError> {
        let pos =
            self.items.iter().position(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound(product_id))?;
        let item = &mut self.items[pos];
        match action {
            QtyAction::Increment => {
                item.qty = item.qty.checked_add(1).ok_or(CartError::QuantityOverflow(product_id))?;
            },
            QtyAction::Decrement => {
                item.qty -= 1;
                if item.qty <= 0 {
                    self.items.remove(pos);
                }
            },
        }
        self.touch();
        Ok(())
    }

    /// Removes the line for the product if there is one. Removing an absent product is not an error.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product_id != product_id);
        self.touch();
    }

    /// Empties the cart, as happens after a successful checkout.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
