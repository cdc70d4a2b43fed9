//! Catalog product types.

use rust_decimal::Decimal;
use serde::Serialize;

use aabhushan_core::{Price, ProductCategory, ProductId};

/// One labelled specification row (e.g. `Metal: 22K Gold`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specification {
    pub label: String,
    pub value: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    pub price: Price,
    /// Compare-at price, shown struck through when higher than `price`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    /// Formatted price (`₹45,000` or `Price on request`).
    pub price_display: String,
    pub image: String,
    pub images: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specifications: Vec<Specification>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shipping_return_policy: Vec<String>,
    pub in_stock: bool,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    pub reviews: u32,
}

impl Product {
    /// Whether a compare-at price above the selling price exists.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price
            .is_some_and(|original| original.amount > self.price.amount)
    }

    /// Case-insensitive substring match on name or description.
    #[must_use]
    pub fn matches_search(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }
}
