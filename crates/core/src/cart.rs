//! Shopping cart state container.
//!
//! The cart is owned by the client process and lives in memory only; it
//! resets whenever the process restarts. Lines keep insertion order for
//! display and are unique by [`LineKey`]: adding an item that is already in
//! the cart bumps its quantity instead of adding a second line.
//!
//! Quantities are always at least one. Setting a quantity below one is
//! rejected without touching the cart; it never removes the line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Purchasable;
use crate::types::{MenuId, Price, ProductId};

/// Errors returned by cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity below one.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),
}

/// Identifies a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LineKey {
    Product(ProductId),
    Menu(MenuId),
}

impl From<ProductId> for LineKey {
    fn from(id: ProductId) -> Self {
        Self::Product(id)
    }
}

impl From<MenuId> for LineKey {
    fn from(id: MenuId) -> Self {
        Self::Menu(id)
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product:{id}"),
            Self::Menu(id) => write!(f, "menu:{id}"),
        }
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: LineKey,
    pub name: String,
    pub unit_price: Price,
    quantity: u32,
    pub image: Option<String>,
}

impl CartLine {
    /// Number of units on this line (always >= 1).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    open: bool,
}

impl Cart {
    /// Create an empty, closed cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            open: false,
        }
    }

    /// Add one unit of an item.
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`Cart::add_item`].
    pub fn add<'a>(&mut self, item: impl Into<Purchasable<'a>>) -> Result<(), CartError> {
        self.add_item(item, 1)
    }

    /// Add `quantity` units of an item and open the cart.
    ///
    /// Merges into the existing line when the item is already in the cart,
    /// otherwise appends a new line at the end.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a quantity of zero; the cart
    /// (including its visibility) is left untouched.
    pub fn add_item<'a>(
        &mut self,
        item: impl Into<Purchasable<'a>>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let item = item.into();
        let key = item.line_key();
        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                key,
                name: item.name().to_string(),
                unit_price: item.unit_price(),
                quantity,
                image: item.image().map(str::to_string),
            });
        }

        self.open = true;
        Ok(())
    }

    /// Remove a line. No-op if absent.
    pub fn remove_item(&mut self, key: impl Into<LineKey>) {
        let key = key.into();
        self.lines.retain(|l| l.key != key);
    }

    /// Set the quantity of a line. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` when `quantity < 1`; the line keeps
    /// its current quantity.
    pub fn set_quantity(&mut self, key: impl Into<LineKey>, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let key = key.into();
        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Sum of `unit_price × quantity` over all lines. Not rounded.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Flip the visibility flag.
    pub const fn toggle_visibility(&mut self) {
        self.open = !self.open;
    }

    /// Hide the cart.
    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line.
    #[must_use]
    pub fn get(&self, key: impl Into<LineKey>) -> Option<&CartLine> {
        let key = key.into();
        self.lines.iter().find(|l| l.key == key)
    }

    /// Number of distinct lines (what the navbar badge shows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}
