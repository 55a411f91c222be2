//! Terminal views.
//!
//! Each view is a plain display struct built from domain data through `From`
//! (or a small constructor when it needs more than one source) and rendered
//! through `Display`. Views never fetch and never mutate state.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use sabor_core::catalog::{ProductFilter, available_categories, group_by_category};
use sabor_core::pos::{OrderItem, PendingOrder, PendingQueue, PosOrder, Receipt, TAX_RATE};
use sabor_core::pricing::{DiscountedProduct, discounted_price};
use sabor_core::{ApiStatus, Cart, CartLine, Identity, Product};

use crate::api::UserSummary;
use crate::filters;
use crate::services::catalog::{Carousel, HeroCarousel};
use crate::services::cashier::QuickSaleItem;
use crate::services::modules::StaffModule;

/// Items of a pending order shown on its card before the "more" line.
const CARD_PREVIEW_ITEMS: usize = 3;

// =============================================================================
// Catalog
// =============================================================================

/// One product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: String,
    /// Discounted price and badge, for products on offer.
    pub offer: Option<(String, String)>,
    pub categories: Vec<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let discount = product.discount_percent();
        let offer = (discount > Decimal::ZERO).then(|| {
            let final_price = discounted_price(product.unit_price(), discount);
            (filters::offer_price(final_price), filters::discount_badge(discount))
        });

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: filters::clp(product.unit_price()),
            offer,
            categories: product.categories.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

impl fmt::Display for ProductView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}  {}", self.id, self.name, self.price)?;
        if let Some((final_price, badge)) = &self.offer {
            write!(f, " → {final_price} ({badge})")?;
        }
        if !self.categories.is_empty() {
            write!(f, "  · {}", self.categories.join(", "))?;
        }
        Ok(())
    }
}

/// The filtered product listing.
#[derive(Debug, Clone)]
pub struct ProductListView {
    pub rows: Vec<ProductView>,
    pub categories: Vec<String>,
    pub total: usize,
}

impl ProductListView {
    #[must_use]
    pub fn new(products: &[Product], filter: &ProductFilter) -> Self {
        Self {
            rows: filter.apply(products).into_iter().map(ProductView::from).collect(),
            categories: available_categories(products),
            total: products.len(),
        }
    }
}

impl fmt::Display for ProductListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Productos ({} de {})", self.rows.len(), self.total)?;
        if !self.categories.is_empty() {
            writeln!(f, "Categorías: {}", self.categories.join(", "))?;
        }
        if self.rows.is_empty() {
            return write!(f, "No se encontraron productos.");
        }
        for row in &self.rows {
            writeln!(f, "  {row}")?;
        }
        Ok(())
    }
}

/// A single product, or the "not found" view.
#[derive(Debug, Clone)]
pub enum ProductDetailView {
    Found {
        product: ProductView,
        description: Option<String>,
        sku: Option<String>,
        images: Vec<String>,
    },
    NotFound,
}

impl From<Option<&Product>> for ProductDetailView {
    fn from(product: Option<&Product>) -> Self {
        product.map_or(Self::NotFound, |p| Self::Found {
            product: ProductView::from(p),
            description: p.description.clone().filter(|d| !d.trim().is_empty()),
            sku: p.sku.clone(),
            images: p.images.iter().map(|i| i.url.clone()).collect(),
        })
    }
}

impl fmt::Display for ProductDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "Producto no encontrado."),
            Self::Found {
                product,
                description,
                sku,
                images,
            } => {
                writeln!(f, "{}", product.name)?;
                write!(f, "Precio: {}", product.price)?;
                if let Some((final_price, badge)) = &product.offer {
                    write!(f, "  Oferta: {final_price} ({badge})")?;
                }
                writeln!(f)?;
                if let Some(sku) = sku {
                    writeln!(f, "SKU: {sku}")?;
                }
                if !product.categories.is_empty() {
                    writeln!(f, "Categorías: {}", product.categories.join(", "))?;
                }
                if let Some(description) = description {
                    writeln!(f, "{description}")?;
                }
                for url in images {
                    writeln!(f, "  {url}")?;
                }
                Ok(())
            }
        }
    }
}

/// Products grouped by category, categories in name order.
#[derive(Debug, Clone)]
pub struct MenuView {
    pub groups: BTreeMap<String, Vec<ProductView>>,
}

impl From<&[Product]> for MenuView {
    fn from(products: &[Product]) -> Self {
        Self {
            groups: group_by_category(products)
                .into_iter()
                .map(|(category, products)| {
                    (category, products.into_iter().map(ProductView::from).collect())
                })
                .collect(),
        }
    }
}

impl fmt::Display for MenuView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return write!(f, "El menú está vacío.");
        }
        for (category, rows) in &self.groups {
            writeln!(f, "== {category} ==")?;
            for row in rows {
                writeln!(f, "  {row}")?;
            }
        }
        Ok(())
    }
}

/// One offer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferView {
    pub name: String,
    pub original: String,
    pub final_price: String,
    pub badge: String,
}

impl From<&DiscountedProduct<'_>> for OfferView {
    fn from(offer: &DiscountedProduct<'_>) -> Self {
        Self {
            name: offer.product.name.clone(),
            original: filters::clp(offer.product.unit_price()),
            final_price: filters::offer_price(offer.final_price),
            badge: filters::discount_badge(offer.product.discount_percent()),
        }
    }
}

impl fmt::Display for OfferView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}  antes {}  ahora {}",
            self.badge, self.name, self.original, self.final_price
        )
    }
}

/// Home page: the hero slide and the visible page of the offers strip.
#[derive(Debug, Clone)]
pub struct OffersView {
    pub hero: Option<OfferView>,
    pub strip: Vec<OfferView>,
    pub position: usize,
    pub total: usize,
}

impl OffersView {
    #[must_use]
    pub fn new(
        hero_offers: &[DiscountedProduct<'_>],
        hero: &HeroCarousel,
        offers: &[DiscountedProduct<'_>],
        carousel: &Carousel,
    ) -> Self {
        Self {
            hero: hero_offers.get(hero.current()).map(OfferView::from),
            strip: offers
                .get(carousel.visible())
                .unwrap_or_default()
                .iter()
                .map(OfferView::from)
                .collect(),
            position: carousel.position(),
            total: offers.len(),
        }
    }
}

impl fmt::Display for OffersView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return write!(f, "No hay ofertas disponibles.");
        }
        if let Some(hero) = &self.hero {
            writeln!(f, "★ {hero}")?;
        }
        writeln!(
            f,
            "Ofertas Destacadas ({}-{} de {})",
            self.position + 1,
            self.position + self.strip.len(),
            self.total
        )?;
        for offer in &self.strip {
            writeln!(f, "  {offer}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub key: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            key: line.key.to_string(),
            name: line.name.clone(),
            quantity: line.quantity(),
            price: filters::clp(line.unit_price),
            line_price: filters::clp(line.line_total()),
        }
    }
}

/// The cart drawer.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
    /// Distinct lines, as shown on the cart badge.
    pub badge: usize,
    pub open: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: filters::clp(cart.subtotal()),
            item_count: cart.total_quantity(),
            badge: cart.len(),
            open: cart.is_open(),
        }
    }
}

impl fmt::Display for CartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.open { "abierto" } else { "cerrado" };
        writeln!(f, "Carrito [{}] ({state})", self.badge)?;
        if self.items.is_empty() {
            return write!(f, "Tu carrito está vacío.");
        }
        for item in &self.items {
            writeln!(
                f,
                "  {} {} x{}  {} c/u  {}",
                item.key, item.name, item.quantity, item.price, item.line_price
            )?;
        }
        write!(f, "Subtotal ({} unidades): {}", self.item_count, self.subtotal)
    }
}

// =============================================================================
// Users, identity, health
// =============================================================================

/// The `/users` listing.
#[derive(Debug, Clone)]
pub struct UsersView {
    pub rows: Vec<String>,
}

impl From<&[UserSummary]> for UsersView {
    fn from(users: &[UserSummary]) -> Self {
        Self {
            rows: users
                .iter()
                .map(|u| {
                    let edad = u.edad.map_or_else(|| "-".to_string(), |e| e.to_string());
                    format!("{} ({edad}) {}", u.nombre, u.email)
                })
                .collect(),
        }
    }
}

impl fmt::Display for UsersView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "Sin usuarios");
        }
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Who is signed in.
#[derive(Debug, Clone)]
pub struct IdentityView(Option<(String, String, String)>);

impl From<Option<&Identity>> for IdentityView {
    fn from(identity: Option<&Identity>) -> Self {
        Self(identity.map(|i| (i.name.clone(), i.email.clone(), i.role.to_string())))
    }
}

impl fmt::Display for IdentityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some((name, email, role)) => write!(f, "{name} <{email}> ({role})"),
            None => write!(f, "No has iniciado sesión."),
        }
    }
}

/// Backend reachability indicator.
#[derive(Debug, Clone, Copy)]
pub struct HealthView(pub ApiStatus);

impl fmt::Display for HealthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.0 {
            ApiStatus::Checking => "…",
            ApiStatus::Online => "●",
            ApiStatus::Offline => "○",
        };
        write!(f, "API {marker} {}", self.0)
    }
}

/// Staff modules the signed-in role may open.
#[derive(Debug, Clone)]
pub struct ModulesView {
    pub rows: Vec<String>,
}

impl From<&[&StaffModule]> for ModulesView {
    fn from(modules: &[&StaffModule]) -> Self {
        Self {
            rows: modules
                .iter()
                .map(|m| format!("{:<10} {:<13} {}", m.name, m.path, m.description))
                .collect(),
        }
    }
}

impl fmt::Display for ModulesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "No tienes módulos disponibles.");
        }
        writeln!(f, "Módulos")?;
        for row in &self.rows {
            writeln!(f, "  {row}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Cashier
// =============================================================================

fn tax_label() -> String {
    format!("IVA ({}%)", (TAX_RATE * Decimal::ONE_HUNDRED).normalize())
}

fn write_item_rows(f: &mut fmt::Formatter<'_>, items: &[OrderItem]) -> fmt::Result {
    for item in items {
        writeln!(
            f,
            "  [{}] {} x{}  {}",
            item.product_id,
            item.name,
            item.quantity(),
            filters::ticket_amount(item.subtotal())
        )?;
    }
    Ok(())
}

/// The quick-sale buttons.
#[derive(Debug, Clone)]
pub struct QuickSaleView<'a>(pub &'a [QuickSaleItem]);

impl fmt::Display for QuickSaleView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.0 {
            writeln!(f, "  [{}] {}  {}", item.id, item.name, filters::ticket_amount(item.price))?;
        }
        Ok(())
    }
}

/// The ticket being rung up.
#[derive(Debug, Clone)]
pub struct TicketView<'a>(pub &'a PosOrder);

impl fmt::Display for TicketView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.0;
        writeln!(f, "Ticket #{}", order.number())?;
        if order.is_empty() {
            writeln!(f, "  (vacío)")?;
        }
        write_item_rows(f, order.items())?;

        let summary = order.summary();
        writeln!(f, "Subtotal: {}", filters::ticket_amount(summary.subtotal))?;
        writeln!(f, "{}: {}", tax_label(), filters::ticket_amount(summary.tax))?;
        write!(f, "Total: {}", filters::ticket_amount(summary.total))
    }
}

/// A processed sale.
#[derive(Debug, Clone)]
pub struct ReceiptView<'a>(pub &'a Receipt);

impl fmt::Display for ReceiptView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receipt = self.0;
        writeln!(
            f,
            "Venta #{} procesada ({})",
            receipt.number,
            filters::local_time(receipt.created_at)
        )?;
        write_item_rows(f, &receipt.items)?;
        writeln!(f, "Subtotal: {}", filters::ticket_amount(receipt.summary.subtotal))?;
        writeln!(f, "{}: {}", tax_label(), filters::ticket_amount(receipt.summary.tax))?;
        writeln!(f, "Total: {}", filters::ticket_amount(receipt.summary.total))?;
        write!(f, "Comprobante {}", receipt.id)
    }
}

/// The remote order inbox as cards.
#[derive(Debug, Clone)]
pub struct PendingOrdersView<'a>(pub &'a PendingQueue);

impl fmt::Display for PendingOrdersView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.0;
        writeln!(f, "Pedidos Remotos Pendientes ({})", queue.len())?;
        if queue.is_empty() {
            return write!(f, "No hay pedidos pendientes de aprobación.");
        }
        for order in queue.orders() {
            writeln!(f, "Pedido Remoto #{}  {}", order.id, order.source)?;
            for item in order.items.iter().take(CARD_PREVIEW_ITEMS) {
                writeln!(f, "  {}x {}", item.quantity, item.name)?;
            }
            let hidden = order.items.len().saturating_sub(CARD_PREVIEW_ITEMS);
            if hidden > 0 {
                writeln!(f, "  ... ({hidden} más)")?;
            }
            writeln!(f, "  Total: {}", filters::ticket_amount(order.total))?;
        }
        Ok(())
    }
}

/// An opened remote order.
#[derive(Debug, Clone)]
pub struct PendingOrderView<'a>(pub &'a PendingOrder);

impl fmt::Display for PendingOrderView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.0;
        writeln!(f, "Detalle del Pedido #{}", order.id)?;
        writeln!(f, "Fuente: {}", order.source)?;
        for item in &order.items {
            writeln!(
                f,
                "  {}x {}  {} c/u",
                item.quantity,
                item.name,
                filters::ticket_amount(item.price)
            )?;
        }
        write!(f, "TOTAL: {}", filters::ticket_amount(order.total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use sabor_core::pos::{PendingItem, PendingQueue};
    use sabor_core::{PendingOrderId, PendingOrderStatus, Price, ProductId, Role, UserId};
    use serde_json::json;

    fn products() -> Vec<Product> {
        serde_json::from_value(json!([
            { "id": 1, "nombre": "Completo", "price": 3000, "discount": 25,
              "categorias": [{ "vch_nombre": "Sandwiches" }] },
            { "id": 2, "nombre": "Churrasco", "price": 10000,
              "categorias": [{ "vch_nombre": "Sandwiches" }] },
            { "id": 3, "nombre": "Agua", "price": 1000, "discount": 100 }
        ]))
        .unwrap()
    }

    #[test]
    fn test_product_view_offer() {
        let products = products();
        let view = ProductView::from(&products[0]);
        assert_eq!(view.price, "$3.000");
        assert_eq!(view.offer, Some(("$2.250".to_string(), "-25%".to_string())));
        assert_eq!(view.to_string(), "[1] Completo  $3.000 → $2.250 (-25%)  · Sandwiches");

        let free = ProductView::from(&products[2]);
        assert_eq!(free.offer.unwrap().0, "el producto es gratis");
    }

    #[test]
    fn test_product_list_filtered() {
        let products = products();
        let mut filter = ProductFilter::default();
        filter.search = "chu".to_string();
        let view = ProductListView::new(&products, &filter);
        assert_eq!(view.rows.len(), 1);
        assert!(view.to_string().starts_with("Productos (1 de 3)"));

        filter.search = "pizza".to_string();
        assert!(
            ProductListView::new(&products, &filter)
                .to_string()
                .ends_with("No se encontraron productos.")
        );
    }

    #[test]
    fn test_product_detail_not_found() {
        assert_eq!(ProductDetailView::from(None).to_string(), "Producto no encontrado.");
    }

    #[test]
    fn test_menu_groups() {
        let products = products();
        let view = MenuView::from(products.as_slice());
        let categories: Vec<_> = view.groups.keys().cloned().collect();
        assert_eq!(categories, ["Otros", "Sandwiches"]);
        assert_eq!(view.groups["Sandwiches"].len(), 2);
    }

    #[test]
    fn test_offers_view() {
        let products = products();
        let offers = sabor_core::pricing::project_discounts(&products);
        let hero = HeroCarousel::new(offers.len());
        let view = OffersView::new(&offers, &hero, &offers, &Carousel::new(offers.len()));
        assert_eq!(view.strip.len(), 2);
        assert_eq!(view.hero.unwrap().name, "Completo");
    }

    #[test]
    fn test_cart_view() {
        let products = products();
        let mut cart = Cart::new();
        cart.add(&products[0]).unwrap();
        cart.add(&products[0]).unwrap();
        cart.add(&products[1]).unwrap();

        let view = CartView::from(&cart);
        assert_eq!(view.badge, 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$16.000");
        assert!(view.open);
        assert!(view.to_string().contains("Completo x2"));

        assert!(CartView::from(&Cart::new()).to_string().ends_with("Tu carrito está vacío."));
    }

    #[test]
    fn test_users_view_empty() {
        assert_eq!(UsersView::from(&[] as &[UserSummary]).to_string(), "Sin usuarios");
    }

    #[test]
    fn test_identity_view() {
        let identity = Identity {
            id: UserId::new(1),
            name: "Ana".to_string(),
            email: "ana@saboryfuego.cl".to_string(),
            role: Role::Admin,
        };
        assert_eq!(
            IdentityView::from(Some(&identity)).to_string(),
            "Ana <ana@saboryfuego.cl> (admin)"
        );
        assert_eq!(IdentityView::from(None).to_string(), "No has iniciado sesión.");
    }

    #[test]
    fn test_modules_view() {
        use crate::services::modules::available_modules;

        let text = ModulesView::from(available_modules(Some(Role::Cashier)).as_slice()).to_string();
        assert!(text.contains("/cashierPage"));
        assert!(!text.contains("/usuarios"));

        let none = ModulesView::from(available_modules(Some(Role::Client)).as_slice()).to_string();
        assert_eq!(none, "No tienes módulos disponibles.");
    }

    #[test]
    fn test_ticket_view() {
        let mut order = PosOrder::new();
        order.add(ProductId::new(1), "Hamburguesa Clásica", Price::new(Decimal::new(1250, 2)));
        let text = TicketView(&order).to_string();
        assert!(text.starts_with("Ticket #101"));
        assert!(text.contains("IVA (19%): $2.38"));
        assert!(text.ends_with("Total: $14.88"));
    }

    #[test]
    fn test_pending_card_truncates_items() {
        let item = |name: &str| PendingItem {
            name: name.to_string(),
            quantity: 1,
            price: Price::from(1),
        };
        let queue = PendingQueue::new(vec![PendingOrder {
            id: PendingOrderId::new(7),
            source: "Mesa 3".to_string(),
            items: vec![item("a"), item("b"), item("c"), item("d"), item("e")],
            total: Price::from(5),
            status: PendingOrderStatus::Pending,
        }]);
        let text = PendingOrdersView(&queue).to_string();
        assert!(text.contains("1x c"));
        assert!(!text.contains("1x d"));
        assert!(text.contains("... (2 más)"));
    }
}
