//! The order assembler: turns a priced cart into an immutable order.
use bazaar_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::db_types::{CustomerId, NewOrder, OrderLine, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("{0} is no longer available")]
    ProductUnavailable(ProductId),
    #[error("The order total is too large")]
    TotalOverflow,
}

/// A cart line joined against the live catalog. `price` is `None` when the product has since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PricedCartLine {
    pub product_id: ProductId,
    pub qty: i64,
    pub price: Option<Money>,
}

/// Everything needed to check out a customer's cart, read in a single consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub customer_id: CustomerId,
    pub address: String,
    pub version: i64,
    pub lines: Vec<PricedCartLine>,
}

impl PricedCart {
    /// Snapshots the current prices into a new order.
    ///
    /// Fails with [`AssemblyError::EmptyCart`] if there is nothing to order, and with
    /// [`AssemblyError::ProductUnavailable`] for the first line whose product no longer exists.
    pub fn assemble(&self) -> Result<NewOrder, AssemblyError> {
        if self.lines.is_empty() {
            return Err(AssemblyError::EmptyCart);
        }
        let lines = self
            .lines
            .iter()
            .map(|l| {
                let price = l.price.ok_or(AssemblyError::ProductUnavailable(l.product_id))?;
                Ok(OrderLine { product_id: l.product_id, qty: l.qty, price })
            })
            .collect::<Result<Vec<OrderLine>, AssemblyError>>()?;
        let total_price = lines.iter().try_fold(Money::default(), |acc, line| {
            line.line_total().and_then(|t| acc.checked_add(t)).ok_or(AssemblyError::TotalOverflow)
        })?;
        Ok(NewOrder { customer_id: self.customer_id, lines, total_price, address: self.address.clone() })
    }
}
