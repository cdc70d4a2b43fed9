//! Static product catalog with filtering, sorting, search and pagination.

mod data;

use serde::{Deserialize, Serialize};

use aabhushan_core::{IdError, ProductCategory};

use crate::models::Product;

pub use data::sample_products;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ListingFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "featured")]
    Featured,
    #[serde(rename = "inStock")]
    InStock,
}

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingSort {
    /// Featured products first, otherwise catalog order.
    #[default]
    Featured,
    Name,
    PriceLow,
    PriceHigh,
}

/// Query string of a listing request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub filter: ListingFilter,
    #[serde(default)]
    pub sort: ListingSort,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One page of a category listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<'a> {
    pub category: ProductCategory,
    pub title: &'static str,
    /// Matching products before pagination.
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub products: Vec<&'a Product>,
}

/// In-memory product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Catalog over the built-in sample products.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if a sample product id is invalid.
    pub fn sample() -> Result<Self, IdError> {
        Ok(Self::new(sample_products()?))
    }

    /// Catalog over the given products.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// All products in a category, in catalog order.
    pub fn in_category(&self, category: ProductCategory) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.category == category)
    }

    /// A product by category and id.
    #[must_use]
    pub fn get(&self, category: ProductCategory, id: &str) -> Option<&Product> {
        self.in_category(category).find(|p| p.id.as_str() == id)
    }

    /// Filter, search, sort and paginate a category.
    #[must_use]
    pub fn list(&self, category: ProductCategory, query: &ListingQuery) -> Listing<'_> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut products: Vec<&Product> = self
            .in_category(category)
            .filter(|p| match query.filter {
                ListingFilter::All => true,
                ListingFilter::Featured => p.featured,
                ListingFilter::InStock => p.in_stock,
            })
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches_search(n)))
            .collect();

        // sort_by is stable, so ties keep catalog order
        match query.sort {
            ListingSort::Featured => products.sort_by(|a, b| b.featured.cmp(&a.featured)),
            ListingSort::Name => {
                products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            }
            ListingSort::PriceLow => products.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            ListingSort::PriceHigh => products.sort_by(|a, b| b.price.amount.cmp(&a.price.amount)),
        }

        let total = products.len();
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let start = (page as usize - 1).saturating_mul(limit as usize);
        let products = products
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Listing {
            category,
            title: category.title(),
            total,
            page,
            limit,
            products,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::sample().unwrap()
    }

    fn ids(listing: &Listing<'_>) -> Vec<String> {
        listing
            .products
            .iter()
            .map(|p| p.id.as_str().to_owned())
            .collect()
    }

    #[test]
    fn test_every_category_has_products() {
        let catalog = catalog();
        for category in ProductCategory::ALL {
            assert!(catalog.in_category(category).count() > 0, "{category}");
        }
    }

    #[test]
    fn test_default_sort_puts_featured_first_stably() {
        let catalog = catalog();
        let listing = catalog.list(ProductCategory::Crystals, &ListingQuery::default());
        assert_eq!(ids(&listing), vec!["cr-001", "cr-003", "cr-002"]);
    }

    #[test]
    fn test_sort_by_price() {
        let catalog = catalog();
        let low = catalog.list(
            ProductCategory::WoodenBeads,
            &ListingQuery {
                sort: ListingSort::PriceLow,
                ..ListingQuery::default()
            },
        );
        assert_eq!(ids(&low), vec!["wb-003", "wb-002", "wb-001"]);

        let high = catalog.list(
            ProductCategory::WoodenBeads,
            &ListingQuery {
                sort: ListingSort::PriceHigh,
                ..ListingQuery::default()
            },
        );
        assert_eq!(ids(&high), vec!["wb-001", "wb-002", "wb-003"]);
    }

    #[test]
    fn test_sort_by_name() {
        let catalog = catalog();
        let listing = catalog.list(
            ProductCategory::TreasuredGifts,
            &ListingQuery {
                sort: ListingSort::Name,
                ..ListingQuery::default()
            },
        );
        assert_eq!(ids(&listing), vec!["tg-003", "tg-001", "tg-002"]);
    }

    #[test]
    fn test_filter_featured() {
        let catalog = catalog();
        let listing = catalog.list(
            ProductCategory::Kalapatt,
            &ListingQuery {
                filter: ListingFilter::Featured,
                ..ListingQuery::default()
            },
        );
        assert_eq!(ids(&listing), vec!["kp-001", "kp-003"]);
        assert_eq!(listing.total, 2);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let catalog = catalog();
        let by_name = catalog.list(
            ProductCategory::FineJewellery,
            &ListingQuery {
                search: Some("DIAMOND".to_string()),
                ..ListingQuery::default()
            },
        );
        assert_eq!(ids(&by_name), vec!["fj-001", "fj-005", "fj-008"]);

        let by_description = catalog.list(
            ProductCategory::FineJewellery,
            &ListingQuery {
                search: Some("colombia".to_string()),
                ..ListingQuery::default()
            },
        );
        assert_eq!(ids(&by_description), vec!["fj-007"]);
    }

    #[test]
    fn test_pagination() {
        let catalog = catalog();
        let listing = catalog.list(
            ProductCategory::FineJewellery,
            &ListingQuery {
                page: Some(2),
                limit: Some(3),
                ..ListingQuery::default()
            },
        );
        assert_eq!(listing.total, 8);
        assert_eq!(ids(&listing), vec!["fj-004", "fj-005", "fj-006"]);

        let beyond = catalog.list(
            ProductCategory::FineJewellery,
            &ListingQuery {
                page: Some(9),
                limit: Some(3),
                ..ListingQuery::default()
            },
        );
        assert!(beyond.products.is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let catalog = catalog();
        let tikka = catalog.get(ProductCategory::Shringaar, "1").unwrap();
        assert_eq!(tikka.name, "Traditional Kundan Maang Tikka");
        assert!(tikka.is_discounted());
        assert!(catalog.get(ProductCategory::Crystals, "1").is_none());
        assert!(catalog.get(ProductCategory::FineJewellery, "fj-999").is_none());
    }

    #[test]
    fn test_price_on_request_product() {
        let catalog = catalog();
        let pendant = catalog.get(ProductCategory::FineJewellery, "fj-005").unwrap();
        assert!(pendant.price.is_on_request());
        assert_eq!(pendant.price_display, "Price on request");
    }
}
