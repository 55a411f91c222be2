//! Cashier point of sale.
//!
//! Two independent pieces of state:
//!
//! - [`PosOrder`] - the direct-sale ticket being rung up at the register
//! - [`PendingQueue`] - remote orders (tables, online) waiting for approval
//!
//! Nothing here talks to the backend; an accepted order or a processed
//! receipt is handed back to the caller to forward to the kitchen.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{PendingOrderId, PendingOrderStatus, Price, ProductId};

/// Sales tax applied to a direct-sale ticket (IVA, 19%).
pub const TAX_RATE: Decimal = Decimal::from_parts(19, 0, 0, false, 2);

/// Number of the first ticket rung up after the register opens.
pub const FIRST_TICKET_NUMBER: u32 = 101;

/// Errors raised by the point of sale.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PosError {
    #[error("El pedido está vacío. Agregue productos.")]
    EmptyOrder,

    #[error("Pedido remoto #{0} no encontrado.")]
    OrderNotFound(PendingOrderId),

    #[error("Debe indicar el motivo de la cancelación.")]
    MissingReason,
}

// =============================================================================
// Direct sale
// =============================================================================

/// One line on the register ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    quantity: u32,
}

impl OrderItem {
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ticket totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    fn from_subtotal(subtotal: Price) -> Self {
        let tax = Price::new(subtotal.amount().saturating_mul(TAX_RATE));
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

/// A processed direct sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub number: u32,
    pub items: Vec<OrderItem>,
    pub summary: OrderSummary,
    pub created_at: DateTime<Utc>,
}

/// The ticket currently open at the register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosOrder {
    number: u32,
    items: Vec<OrderItem>,
}

impl Default for PosOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl PosOrder {
    /// An empty ticket numbered [`FIRST_TICKET_NUMBER`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            number: FIRST_TICKET_NUMBER,
            items: Vec::new(),
        }
    }

    /// Ring up one unit. A product already on the ticket gains one unit.
    pub fn add(&mut self, product_id: ProductId, name: &str, price: Price) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }

        self.items.push(OrderItem {
            product_id,
            name: name.to_string(),
            price,
            quantity: 1,
        });
    }

    /// Drop a line. Unknown ids are ignored.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Empty the ticket, keeping its number.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::from_subtotal(self.items.iter().map(OrderItem::subtotal).sum())
    }

    /// Process the sale and open the next ticket.
    ///
    /// # Errors
    ///
    /// Returns `PosError::EmptyOrder` if nothing has been rung up; the ticket
    /// is left untouched.
    pub fn checkout(&mut self) -> Result<Receipt, PosError> {
        if self.items.is_empty() {
            return Err(PosError::EmptyOrder);
        }

        let summary = self.summary();
        let receipt = Receipt {
            id: Uuid::new_v4(),
            number: self.number,
            items: std::mem::take(&mut self.items),
            summary,
            created_at: Utc::now(),
        };
        self.number = self.number.saturating_add(1);

        tracing::info!(
            ticket = receipt.number,
            total = %receipt.summary.total,
            "Direct sale processed"
        );

        Ok(receipt)
    }
}

// =============================================================================
// Remote approval
// =============================================================================

/// One line of a remote order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

/// A remote order waiting at the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: PendingOrderId,
    /// Where it came from, e.g. `Mesa 5` or `Online #123`.
    pub source: String,
    pub items: Vec<PendingItem>,
    pub total: Price,
    #[serde(default)]
    pub status: PendingOrderStatus,
}

/// Remote orders in arrival order, plus the one opened for detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueue {
    orders: Vec<PendingOrder>,
    opened: Option<PendingOrderId>,
}

impl PendingQueue {
    #[must_use]
    pub const fn new(orders: Vec<PendingOrder>) -> Self {
        Self { orders, opened: None }
    }

    #[must_use]
    pub fn orders(&self) -> &[PendingOrder] {
        &self.orders
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Open an order's detail.
    ///
    /// # Errors
    ///
    /// Returns `PosError::OrderNotFound` for an id not in the queue.
    pub fn open(&mut self, id: PendingOrderId) -> Result<&PendingOrder, PosError> {
        let order = self
            .orders
            .iter()
            .find(|o| o.id == id)
            .ok_or(PosError::OrderNotFound(id))?;
        self.opened = Some(id);
        Ok(order)
    }

    pub const fn close(&mut self) {
        self.opened = None;
    }

    /// The order whose detail is open.
    #[must_use]
    pub fn opened(&self) -> Option<&PendingOrder> {
        let id = self.opened?;
        self.orders.iter().find(|o| o.id == id)
    }

    /// Approve an order and take it off the queue for the kitchen.
    ///
    /// # Errors
    ///
    /// Returns `PosError::OrderNotFound` for an id not in the queue.
    pub fn accept(&mut self, id: PendingOrderId) -> Result<PendingOrder, PosError> {
        let mut order = self.take(id)?;
        order.status = PendingOrderStatus::Accepted;
        tracing::info!(order_id = %id, source = %order.source, "Remote order accepted");
        Ok(order)
    }

    /// Reject an order. A non-blank reason is required.
    ///
    /// # Errors
    ///
    /// Returns `PosError::MissingReason` for a blank reason or
    /// `PosError::OrderNotFound` for an id not in the queue.
    pub fn cancel(&mut self, id: PendingOrderId, reason: &str) -> Result<PendingOrder, PosError> {
        if reason.trim().is_empty() {
            return Err(PosError::MissingReason);
        }

        let mut order = self.take(id)?;
        order.status = PendingOrderStatus::Cancelled;
        tracing::info!(order_id = %id, reason = reason.trim(), "Remote order cancelled");
        Ok(order)
    }

    fn take(&mut self, id: PendingOrderId) -> Result<PendingOrder, PosError> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(PosError::OrderNotFound(id))?;
        if self.opened == Some(id) {
            self.opened = None;
        }
        Ok(self.orders.remove(index))
    }
}
