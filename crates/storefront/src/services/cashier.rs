//! Cashier desk: the register ticket and the remote order inbox.
//!
//! Only cashiers and admins may open the desk. The register sells from a
//! fixed quick-sale menu; the inbox starts with the orders waiting at the
//! counter. Neither is sent to the backend yet.

use rust_decimal::Decimal;

use sabor_core::pos::{PendingItem, PendingOrder, PendingQueue, PosOrder, Receipt};
use sabor_core::{Identity, PendingOrderId, PendingOrderStatus, Price, ProductId};

use crate::error::{AppError, add_breadcrumb};

/// A quick-sale button on the register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSaleItem {
    pub id: ProductId,
    pub name: &'static str,
    pub price: Price,
}

/// Register and inbox for one signed-in cashier.
#[derive(Debug, Clone)]
pub struct CashierDesk {
    menu: Vec<QuickSaleItem>,
    order: PosOrder,
    inbox: PendingQueue,
}

impl CashierDesk {
    /// Open the desk for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when nobody is signed in or the role
    /// may not operate the register.
    pub fn open(identity: Option<&Identity>) -> Result<Self, AppError> {
        match identity {
            Some(identity) if identity.role.can_operate_register() => {
                tracing::info!(user_id = %identity.id, role = %identity.role, "Cashier desk opened");
                Ok(Self {
                    menu: quick_sale_menu(),
                    order: PosOrder::new(),
                    inbox: PendingQueue::new(waiting_orders()),
                })
            }
            Some(identity) => Err(AppError::Forbidden(format!(
                "el rol '{}' no puede operar la caja",
                identity.role
            ))),
            None => Err(AppError::Forbidden("inicia sesión como cajero".to_string())),
        }
    }

    #[must_use]
    pub fn menu(&self) -> &[QuickSaleItem] {
        &self.menu
    }

    #[must_use]
    pub const fn order(&self) -> &PosOrder {
        &self.order
    }

    #[must_use]
    pub const fn inbox(&self) -> &PendingQueue {
        &self.inbox
    }

    /// Ring up one unit of a quick-sale item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an id not on the quick-sale menu.
    pub fn ring_up(&mut self, id: ProductId) -> Result<(), AppError> {
        let item = self
            .menu
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(format!("producto {id} en el menú de caja")))?;
        self.order.add(item.id, item.name, item.price);
        Ok(())
    }

    /// Drop a line from the ticket.
    pub fn void(&mut self, id: ProductId) {
        self.order.remove(id);
    }

    /// Empty the ticket.
    pub fn clear_ticket(&mut self) {
        self.order.clear();
    }

    /// Process the ticket.
    ///
    /// # Errors
    ///
    /// Returns `PosError::EmptyOrder` for an empty ticket.
    pub fn checkout(&mut self) -> Result<Receipt, AppError> {
        let receipt = self.order.checkout()?;
        add_breadcrumb(
            "cashier",
            "Direct sale processed",
            Some(&[("ticket", receipt.number.to_string().as_str())][..]),
        );
        Ok(receipt)
    }

    /// Open a remote order's detail.
    ///
    /// # Errors
    ///
    /// Returns `PosError::OrderNotFound` for an unknown id.
    pub fn open_order(&mut self, id: PendingOrderId) -> Result<&PendingOrder, AppError> {
        Ok(self.inbox.open(id)?)
    }

    pub const fn close_order(&mut self) {
        self.inbox.close();
    }

    /// Accept a remote order and hand it to the kitchen.
    ///
    /// # Errors
    ///
    /// Returns `PosError::OrderNotFound` for an unknown id.
    pub fn accept(&mut self, id: PendingOrderId) -> Result<PendingOrder, AppError> {
        Ok(self.inbox.accept(id)?)
    }

    /// Cancel a remote order.
    ///
    /// # Errors
    ///
    /// Returns `PosError::MissingReason` for a blank reason or
    /// `PosError::OrderNotFound` for an unknown id.
    pub fn cancel(&mut self, id: PendingOrderId, reason: &str) -> Result<PendingOrder, AppError> {
        Ok(self.inbox.cancel(id, reason)?)
    }
}

fn price(cents: i64) -> Price {
    Price::new(Decimal::new(cents, 2))
}

/// Quick-sale buttons of the register.
fn quick_sale_menu() -> Vec<QuickSaleItem> {
    vec![
        QuickSaleItem {
            id: ProductId::new(1),
            name: "Hamburguesa Clásica",
            price: price(1250),
        },
        QuickSaleItem {
            id: ProductId::new(2),
            name: "Papas Fritas",
            price: price(800),
        },
        QuickSaleItem {
            id: ProductId::new(3),
            name: "Coca Cola",
            price: price(350),
        },
        QuickSaleItem {
            id: ProductId::new(4),
            name: "Sopa del Día",
            price: price(600),
        },
    ]
}

/// Orders waiting at the counter when the desk opens.
fn waiting_orders() -> Vec<PendingOrder> {
    let item = |name: &str, quantity, cents| PendingItem {
        name: name.to_string(),
        quantity,
        price: price(cents),
    };

    vec![
        PendingOrder {
            id: PendingOrderId::new(201),
            source: "Mesa 12".to_string(),
            items: vec![item("Ensalada César", 1, 950), item("Agua Mineral", 2, 200)],
            total: price(1350),
            status: PendingOrderStatus::Pending,
        },
        PendingOrder {
            id: PendingOrderId::new(202),
            source: "Online #124".to_string(),
            items: vec![item("Pizza Pepperoni", 1, 1800), item("Cerveza Artesanal", 3, 550)],
            total: price(3450),
            status: PendingOrderStatus::Pending,
        },
    ]
}
