//! Catalog service.
//!
//! Loads catalog data from the backend. Transport and backend failures never
//! reach the caller: a list degrades to empty and a lookup to "not found",
//! with the cause logged.

use tracing::{info, warn};

use sabor_core::pricing::{DiscountedProduct, project_discounts};
use sabor_core::{Product, ProductId};

use crate::api::{ApiClient, UserSummary};

/// Offers shown in the home carousel.
pub const CAROUSEL_VISIBLE: usize = 4;

/// Slides the carousel moves per tick.
pub const CAROUSEL_STEP: usize = 4;

/// Offers featured in the hero banner.
pub const HERO_SLIDES: usize = 5;

/// All products, or an empty list if the backend cannot be reached.
pub async fn list_products(api: &ApiClient) -> Vec<Product> {
    api.products().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to fetch products");
        Vec::new()
    })
}

/// All users, or an empty list if the backend cannot be reached.
pub async fn list_users(api: &ApiClient) -> Vec<UserSummary> {
    api.users().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to fetch users");
        Vec::new()
    })
}

/// One product by id.
///
/// Asks `GET /products/{id}` first; if that fails for any reason, scans
/// `GET /products`. `None` when both fail or nothing matches.
pub async fn product_detail(api: &ApiClient, id: ProductId) -> Option<Product> {
    match api.product(id).await {
        Ok(product) => return Some(product),
        Err(e) => info!(product_id = %id, error = %e, "Direct product lookup failed, scanning list"),
    }

    match api.products().await {
        Ok(products) => find_product(products, id),
        Err(e) => {
            warn!(product_id = %id, error = %e, "Fallback product scan failed");
            None
        }
    }
}

fn find_product(products: Vec<Product>, id: ProductId) -> Option<Product> {
    products.into_iter().find(|p| p.id == id)
}

/// Discounted products for the hero banner: the first [`HERO_SLIDES`] offers.
#[must_use]
pub fn hero_offers(products: &[Product]) -> Vec<DiscountedProduct<'_>> {
    let mut offers = project_discounts(products);
    offers.truncate(HERO_SLIDES);
    offers
}

// =============================================================================
// Carousels
// =============================================================================

/// Home "Ofertas Destacadas" strip.
///
/// Shows [`CAROUSEL_VISIBLE`] offers starting at `position` and advances by
/// [`CAROUSEL_STEP`]. A step that would run past the last full page lands on
/// it; a step from the last full page wraps to the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    position: usize,
}

impl Carousel {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len, position: 0 }
    }

    /// Last position that still shows a full page.
    #[must_use]
    pub const fn max_slide(&self) -> usize {
        self.len.saturating_sub(CAROUSEL_VISIBLE)
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Whether the strip rotates at all.
    #[must_use]
    pub const fn rotates(&self) -> bool {
        self.max_slide() > 0
    }

    /// Move one tick and return the new position.
    pub const fn advance(&mut self) -> usize {
        let max = self.max_slide();
        if max == 0 {
            return self.position;
        }

        let next = self.position + CAROUSEL_STEP;
        self.position = if next <= max {
            next
        } else if self.position == max {
            0
        } else {
            max
        };
        self.position
    }

    /// Index range of the visible items.
    #[must_use]
    pub fn visible(&self) -> std::ops::Range<usize> {
        self.position..(self.position + CAROUSEL_VISIBLE).min(self.len)
    }
}

/// Hero banner: one slide at a time, cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroCarousel {
    len: usize,
    current: usize,
}

impl HeroCarousel {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Move to the next slide, wrapping. No-op without slides.
    pub const fn advance(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
        self.current
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn products() -> Vec<Product> {
        serde_json::from_value(json!([
            { "id": 1, "nombre": "Completo", "price": 3000, "discount": 10 },
            { "id": 2, "nombre": "Churrasco", "price": 10000 },
            { "id": 3, "nombre": "Barros Luco", "price": 8000, "discount": 5 }
        ]))
        .unwrap()
    }

    #[test]
    fn test_find_product() {
        assert_eq!(find_product(products(), ProductId::new(2)).unwrap().name, "Churrasco");
        assert!(find_product(products(), ProductId::new(9)).is_none());
    }

    #[test]
    fn test_hero_offers_only_discounted() {
        let products = products();
        let offers = hero_offers(&products);
        assert_eq!(offers.len(), 2);
    }

    #[test]
    fn test_carousel_no_rotation_when_everything_fits() {
        for len in 0..=4 {
            let mut carousel = Carousel::new(len);
            assert!(!carousel.rotates());
            assert_eq!(carousel.advance(), 0);
        }
    }

    #[test]
    fn test_carousel_lands_on_last_page_then_wraps() {
        // 6 offers: max_slide = 2
        let mut carousel = Carousel::new(6);
        assert_eq!(carousel.max_slide(), 2);
        assert_eq!(carousel.advance(), 2);
        assert_eq!(carousel.advance(), 0);
        assert_eq!(carousel.advance(), 2);
    }

    #[test]
    fn test_carousel_full_steps() {
        // 13 offers: max_slide = 9
        let mut carousel = Carousel::new(13);
        assert_eq!(carousel.advance(), 4);
        assert_eq!(carousel.advance(), 8);
        assert_eq!(carousel.advance(), 9);
        assert_eq!(carousel.visible(), 9..13);
        assert_eq!(carousel.advance(), 0);
        assert_eq!(carousel.visible(), 0..4);
    }

    #[test]
    fn test_carousel_exact_multiple() {
        // 8 offers: max_slide = 4, stepping lands exactly on it
        let mut carousel = Carousel::new(8);
        assert_eq!(carousel.advance(), 4);
        assert_eq!(carousel.advance(), 0);
    }

    #[test]
    fn test_hero_carousel_cycles() {
        let mut hero = HeroCarousel::new(3);
        assert_eq!(hero.advance(), 1);
        assert_eq!(hero.advance(), 2);
        assert_eq!(hero.advance(), 0);

        let mut empty = HeroCarousel::new(0);
        assert_eq!(empty.advance(), 0);
    }
}
