//! The catalog filter. Builds a storage-independent predicate and ordering from free-form browse parameters.
use std::fmt::Display;

use bazaar_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A sort key as supplied by the caller. `field` is not interpreted here; the storage layer decides which fields it
/// can order by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    /// `"price"` sorts ascending by price, `"-price"` descending. Returns `None` for an empty key.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (field, direction) = match s.strip_prefix('-') {
            Some(f) => (f, SortDirection::Descending),
            None => (s, SortDirection::Ascending),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self { field: field.to_string(), direction })
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.field),
            SortDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    /// Inclusive
    pub min_price: Option<Money>,
    /// Inclusive
    pub max_price: Option<Money>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.category.as_ref().map_or(true, |c| product.category.as_ref() == Some(c))
            && self.min_price.map_or(true, |min| product.price >= min)
            && self.max_price.map_or(true, |max| product.price <= max)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.min_price.is_none() && self.max_price.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub sort: Option<SortOrder>,
}

impl ProductQuery {
    pub fn build(
        category: Option<String>,
        min_price: Option<Money>,
        max_price: Option<Money>,
        sort: Option<&str>,
    ) -> Self {
        let category = category.filter(|c| !c.is_empty());
        let filter = ProductFilter { category, min_price, max_price };
        let sort = sort.and_then(SortOrder::parse);
        Self { filter, sort }
    }
}
