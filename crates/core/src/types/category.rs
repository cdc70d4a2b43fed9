//! Catalog product categories.

use serde::{Deserialize, Serialize};

/// Error returned for an unknown category slug.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0}")]
pub struct CategoryError(pub String);

/// Product category, identified in URLs by its kebab-case slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    Crystals,
    Kalapatt,
    WoodenBeads,
    TreasuredGifts,
    Shringaar,
    FineJewellery,
}

impl ProductCategory {
    /// All categories in navigation order.
    pub const ALL: [Self; 6] = [
        Self::FineJewellery,
        Self::Shringaar,
        Self::Crystals,
        Self::Kalapatt,
        Self::WoodenBeads,
        Self::TreasuredGifts,
    ];

    /// URL slug.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Crystals => "crystals",
            Self::Kalapatt => "kalapatt",
            Self::WoodenBeads => "wooden-beads",
            Self::TreasuredGifts => "treasured-gifts",
            Self::Shringaar => "shringaar",
            Self::FineJewellery => "fine-jewellery",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Crystals => "Crystals",
            Self::Kalapatt => "Kalapatt",
            Self::WoodenBeads => "Kashth Kala",
            Self::TreasuredGifts => "Treasured Gifts",
            Self::Shringaar => "Shringaar",
            Self::FineJewellery => "Fine Jewellery",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
