//! Catalogue
//!
//! The product catalogue is supplied by an external provider; here it is loaded
//! from a YAML fixture file. All products in a catalogue share one currency.

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::cart::LineItem;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Current price
    pub price: Money<'a, Currency>,

    /// Pre-discount price, when the product is on offer
    pub original_price: Option<Money<'a, Currency>>,

    /// Image URL
    pub image: String,

    /// Average rating, 0 to 5
    pub rating: f32,

    /// Display category
    pub category: String,

    /// Optional long description
    pub description: Option<String>,
}

/// Catalogue errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalogue file
    #[error("failed to read catalogue file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse catalogue: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// A sku appeared twice in the catalogue
    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    /// Product not found
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// No products loaded yet
    #[error("no products loaded yet; currency unknown")]
    NoCurrency,
}

/// Wrapper for the catalogue YAML document
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<ProductEntry>,
}

/// One product entry in the catalogue YAML
#[derive(Debug, Deserialize)]
struct ProductEntry {
    sku: String,
    name: String,
    price: String,
    original_price: Option<String>,
    image: String,
    rating: f32,
    category: String,
    description: Option<String>,
}

/// Parse a price string (e.g. "129.00 USD") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(CatalogError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency =
        iso::find(currency_code).ok_or_else(|| CatalogError::UnknownCurrency((*currency_code).to_string()))?;

    Ok((minor_units, currency))
}

/// Catalogue
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    keys_by_sku: FxHashMap<String, ProductKey>,

    /// Display ordering, as listed by the provider
    order: Vec<ProductKey>,

    currency: Option<&'a Currency>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: SlotMap::with_key(),
            keys_by_sku: FxHashMap::default(),
            order: Vec::new(),
            currency: None,
        }
    }

    /// Load a catalogue from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// products do not all share one currency.
    pub fn load(path: impl AsRef<Path>) -> Result<Catalog<'static>, CatalogError> {
        let contents = fs::read_to_string(path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        let mut catalog = Catalog::new();

        for entry in fixture.products {
            let (minor_units, currency) = parse_price(&entry.price)?;

            let original_price = entry
                .original_price
                .as_deref()
                .map(parse_price)
                .transpose()?
                .map(|(units, original_currency)| Money::from_minor(units, original_currency));

            let product = Product {
                name: entry.name,
                price: Money::from_minor(minor_units, currency),
                original_price,
                image: entry.image,
                rating: entry.rating,
                category: entry.category,
                description: entry.description,
            };

            catalog.insert(entry.sku, product)?;
        }

        Ok(catalog)
    }

    /// Insert a product under the given sku.
    ///
    /// # Errors
    ///
    /// Returns an error if the sku is already present or if the product's
    /// currency differs from the catalogue currency.
    pub fn insert(&mut self, sku: String, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.keys_by_sku.contains_key(&sku) {
            return Err(CatalogError::DuplicateSku(sku));
        }

        let currency = product.price.currency();

        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(CatalogError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        let key = self.products.insert(product);

        self.keys_by_sku.insert(sku, key);
        self.order.push(key);

        Ok(key)
    }

    /// Get a product by key.
    pub fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Look up a product key by sku.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::ProductNotFound` if the sku is unknown.
    pub fn by_sku(&self, sku: &str) -> Result<ProductKey, CatalogError> {
        self.keys_by_sku
            .get(sku)
            .copied()
            .ok_or_else(|| CatalogError::ProductNotFound(sku.to_string()))
    }

    /// Build a quantity-one cart line item for the given product.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::ProductNotFound` if the key is stale.
    pub fn line_item(&self, key: ProductKey) -> Result<LineItem<'a>, CatalogError> {
        let product = self
            .products
            .get(key)
            .ok_or_else(|| CatalogError::ProductNotFound(format!("{key:?}")))?;

        Ok(LineItem::new(
            key,
            product.name.clone(),
            product.price,
            product.image.clone(),
        ))
    }

    /// Free-text search over name, category and description.
    ///
    /// Matching is a case-insensitive substring test; a blank query returns
    /// the whole catalogue in display order.
    pub fn search(&self, query: &str) -> Vec<ProductKey> {
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            return self.order.clone();
        }

        self.order
            .iter()
            .copied()
            .filter(|key| {
                self.products.get(*key).is_some_and(|product| {
                    product.name.to_lowercase().contains(&query)
                        || product.category.to_lowercase().contains(&query)
                        || product
                            .description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(&query))
                })
            })
            .collect()
    }

    /// Iterate over products in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.order
            .iter()
            .filter_map(|key| self.products.get(*key).map(|product| (*key, product)))
    }

    /// Number of products in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalogue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get the catalogue currency.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::NoCurrency` if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'a Currency, CatalogError> {
        self.currency.ok_or(CatalogError::NoCurrency)
    }
}

impl Default for Catalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}
