//! Product list filtering and grouping.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use unicode_normalization::UnicodeNormalization;

use super::Product;
use crate::types::Price;

/// Category used for products that have none.
pub const UNCATEGORIZED: &str = "Otros";

/// Default upper bound of the price range filter.
pub const DEFAULT_MAX_PRICE: i64 = 10_000_000;

/// Normalize text for accent- and case-insensitive matching.
///
/// Decomposes to NFD, strips combining diacritical marks (U+0300..=U+036F)
/// and lowercases, so `"Café"` and `"cafe"` compare equal.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Filter state of the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Selected categories, stored normalized.
    categories: BTreeSet<String>,
    /// Case-insensitive substring of the product name.
    pub search: String,
    pub min_price: Price,
    pub max_price: Price,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            search: String::new(),
            min_price: Price::ZERO,
            max_price: Price::from(DEFAULT_MAX_PRICE),
        }
    }
}

impl ProductFilter {
    /// Filter preselecting the category named in a link (e.g. `?category=Café`).
    #[must_use]
    pub fn with_category(category: Option<&str>) -> Self {
        let mut filter = Self::default();
        if let Some(category) = category {
            filter.categories.insert(normalize(category));
        }
        filter
    }

    /// Select the category if unselected, unselect it otherwise.
    pub fn toggle_category(&mut self, category: &str) {
        let key = normalize(category);
        if !self.categories.remove(&key) {
            self.categories.insert(key);
        }
    }

    /// Whether the category is currently selected.
    #[must_use]
    pub fn is_selected(&self, category: &str) -> bool {
        self.categories.contains(&normalize(category))
    }

    /// Reset every criterion.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether a product passes every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let matches_category = self.categories.is_empty()
            || product
                .categories
                .iter()
                .any(|c| self.categories.contains(&normalize(&c.name)));

        let matches_search = product
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase());

        let price = product.unit_price();
        let matches_price = price >= self.min_price && price <= self.max_price;

        matches_category && matches_search && matches_price
    }

    /// Products passing the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct category names across the products, sorted.
#[must_use]
pub fn available_categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .flat_map(|p| p.categories.iter().map(|c| c.name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Products grouped under each of their categories, categories sorted by name.
///
/// A product listed in several categories appears in each group; products
/// without a category are grouped under [`UNCATEGORIZED`].
#[must_use]
pub fn group_by_category(products: &[Product]) -> BTreeMap<String, Vec<&Product>> {
    let mut groups: BTreeMap<String, Vec<&Product>> = BTreeMap::new();
    for product in products {
        if product.categories.is_empty() {
            groups
                .entry(UNCATEGORIZED.to_string())
                .or_default()
                .push(product);
        } else {
            for category in &product.categories {
                groups.entry(category.name.clone()).or_default().push(product);
            }
        }
    }
    groups
}

/// Parse a user-typed price bound; blank input means "no bound".
#[must_use]
pub fn parse_price_bound(input: &str) -> Option<Price> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok().map(Price::new)
}
