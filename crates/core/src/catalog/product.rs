//! Product and menu records.
//!
//! Field names follow the backend's JSON (`nombre`, `categorias`, ...) through
//! serde renames; the Rust side uses English names.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cart::LineKey;
use crate::types::{CategoryId, ImageId, MenuId, Price, ProductId};

/// A sellable product from `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unit price; the backend occasionally sends `null`.
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(rename = "descriptions", default)]
    pub description: Option<String>,
    /// Discount percentage (0-100 expected, not enforced).
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(rename = "categorias", default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(rename = "imagenes", default, deserialize_with = "null_as_default")]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Unit price, treating a missing price as zero.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }

    /// Discount percentage, treating a missing discount as zero.
    #[must_use]
    pub fn discount_percent(&self) -> Decimal {
        self.discount.unwrap_or(Decimal::ZERO)
    }

    /// URL of the first image, if any.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<CategoryId>,
    #[serde(rename = "vch_nombre")]
    pub name: String,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: Option<ImageId>,
    #[serde(rename = "url_image")]
    pub url: String,
}

/// A set menu (combo) with its own pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "precio_total")]
    pub total_price: Price,
    #[serde(rename = "precio_con_descuento", default)]
    pub discounted_price: Option<Price>,
    #[serde(rename = "descuento_porcentaje", default)]
    pub discount_percent: Option<Decimal>,
    #[serde(rename = "disponible", default)]
    pub available: bool,
    #[serde(rename = "fecha_inicio", default)]
    pub starts_on: Option<String>,
    #[serde(rename = "fecha_fin", default)]
    pub ends_on: Option<String>,
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
}

impl Menu {
    /// Price charged per menu: the discounted price while a discount is active.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        let discounted = self.discount_percent.is_some_and(|d| d > Decimal::ZERO);
        match self.discounted_price {
            Some(price) if discounted => price,
            _ => self.total_price,
        }
    }
}

/// Anything that can be put in the cart.
///
/// Each variant maps into a cart line through its own arm in
/// [`Purchasable::line_key`], [`Purchasable::name`], [`Purchasable::unit_price`]
/// and [`Purchasable::image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchasable<'a> {
    Product(&'a Product),
    Menu(&'a Menu),
}

impl Purchasable<'_> {
    /// Key identifying the cart line for this item.
    #[must_use]
    pub const fn line_key(&self) -> LineKey {
        match self {
            Self::Product(product) => LineKey::Product(product.id),
            Self::Menu(menu) => LineKey::Menu(menu.id),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Product(product) => &product.name,
            Self::Menu(menu) => &menu.name,
        }
    }

    /// Unit price charged in the cart.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        match self {
            Self::Product(product) => product.unit_price(),
            Self::Menu(menu) => menu.effective_price(),
        }
    }

    /// Image shown next to the cart line.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Product(product) => product.first_image(),
            Self::Menu(menu) => menu.image.as_deref().filter(|url| !url.is_empty()),
        }
    }
}

impl<'a> From<&'a Product> for Purchasable<'a> {
    fn from(product: &'a Product) -> Self {
        Self::Product(product)
    }
}

impl<'a> From<&'a Menu> for Purchasable<'a> {
    fn from(menu: &'a Menu) -> Self {
        Self::Menu(menu)
    }
}

/// Deserialize `null` as the type's default (used for optional arrays).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
