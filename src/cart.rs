//! Cart

use rusty_money::{
    Money, MoneyError,
    iso::Currency,
};
use thiserror::Error;

use crate::catalog::ProductKey;

/// Errors related to cart mutation or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One product entry within a cart or order, carrying its own quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    name: String,
    unit_price: Money<'a, Currency>,
    image: String,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a quantity-one line item for the given product.
    pub fn new(
        product: ProductKey,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            product,
            name: name.into(),
            unit_price,
            image: image.into(),
            quantity: 1,
        }
    }

    /// The product this line refers to.
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Product name as it was at the time the line was created.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price as it was at the time the line was created.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Image URL.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Quantity on this line, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line total: unit price times quantity.
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }
}

/// The in-progress, mutable collection of items a shopper intends to purchase.
///
/// Lines are unique by product key; adding a product that is already present
/// increments its quantity instead of duplicating the row.
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    currency: &'a Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    #[must_use]
    pub fn new(currency: &'a Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Add an item to the cart.
    ///
    /// If a line for the same product already exists its quantity goes up by
    /// one and the incoming payload is otherwise ignored, so a price or name
    /// change in the catalogue does not rewrite lines already in the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::CurrencyMismatch` if the item is priced in a
    /// different currency than the cart.
    pub fn add(&mut self, item: LineItem<'a>) -> Result<(), CartError> {
        let item_currency = item.unit_price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product == item.product)
        {
            existing.quantity += 1;
        } else {
            self.items.push(item);
        }

        Ok(())
    }

    /// Set the quantity of a line exactly.
    ///
    /// A quantity of zero or less removes the line, so no non-positive
    /// quantity is ever observable. Unknown products are ignored.
    pub fn set_quantity(&mut self, product: ProductKey, quantity: i64) {
        if quantity <= 0 {
            self.remove(product);
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|line| line.product == product) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove a line from the cart; no-op when absent.
    pub fn remove(&mut self, product: ProductKey) {
        self.items.retain(|line| line.product != product);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Calculate the cart total, recomputed on every read.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a money arithmetic error.
    pub fn total(&self) -> Result<Money<'a, Currency>, CartError> {
        let total = self.items.iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| acc.add(line.line_total()),
        )?;

        Ok(total)
    }

    /// Get the line for a product, if present.
    pub fn get(&self, product: ProductKey) -> Option<&LineItem<'a>> {
        self.items.iter().find(|line| line.product == product)
    }

    /// Quantity currently in the cart for a product.
    pub fn quantity(&self, product: ProductKey) -> Option<u32> {
        self.get(product).map(LineItem::quantity)
    }

    /// Clone the current lines, e.g. to snapshot them into an order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineItem<'a>> {
        self.items.clone()
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Number of distinct lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}
