//! Cart pricing against the live catalog.
//!
//! The session cart stores only (product id, quantity) lines. Every read
//! reprices those lines at current catalog prices through the [`Catalog`]
//! seam; lines whose product no longer exists are silently dropped rather
//! than failing the whole cart.

use craftloom_core::{Price, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{Cart, NewOrderLine, PricedCart, PricedCartItem, Product};

/// Errors from pricing a cart.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// A line total or the subtotal overflowed.
    #[error("cart total out of range")]
    TotalOverflow,

    /// The catalog lookup failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Catalog seam used to price cart lines.
pub trait Catalog {
    fn get_many(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;
}

impl Catalog for ProductRepository<'_> {
    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        Self::get_many(self, ids).await
    }
}

/// Prices session carts against the catalog.
pub struct CartService<C> {
    catalog: C,
}

impl<C: Catalog> CartService<C> {
    /// Create a cart service over a catalog.
    pub const fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Price a cart at current catalog prices, preserving line order.
    ///
    /// Lines referencing products that have disappeared from the catalog
    /// are dropped from the result.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the catalog lookup fails or a total
    /// overflows.
    pub async fn price(&self, cart: &Cart) -> Result<PricedCart, CartError> {
        let ids: Vec<ProductId> = cart.lines.iter().map(|l| l.product_id).collect();
        let products = self.catalog.get_many(&ids).await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        let mut subtotal = Price::ZERO;
        let mut item_count: u32 = 0;

        for cart_line in &cart.lines {
            let Some(product) = products.iter().find(|p| p.id == cart_line.product_id) else {
                continue;
            };
            let line_total = product
                .price
                .times(cart_line.quantity)
                .ok_or(CartError::TotalOverflow)?;
            subtotal = subtotal
                .checked_add(line_total)
                .ok_or(CartError::TotalOverflow)?;
            item_count = item_count.saturating_add(cart_line.quantity);
            items.push(PricedCartItem {
                product: product.clone(),
                quantity: cart_line.quantity,
                line_total,
            });
        }

        Ok(PricedCart {
            items,
            subtotal,
            item_count,
        })
    }
}

/// Snapshot a priced cart into order lines for checkout.
#[must_use]
pub fn order_lines(priced: &PricedCart) -> Vec<NewOrderLine> {
    priced
        .items
        .iter()
        .map(|item| NewOrderLine {
            product_id: item.product.id,
            quantity: item.quantity,
            price_at_purchase: item.product.price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    struct FakeCatalog {
        products: Vec<Product>,
    }

    impl Catalog for &FakeCatalog {
        async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
    }

    fn product(rupees: i64) -> Product {
        Product {
            id: ProductId::random(),
            name: "Block-print dupatta".to_owned(),
            slug: "block-print-dupatta".to_owned(),
            category: "textiles".to_owned(),
            price: Price::from_rupees(rupees),
            original_price: None,
            images: Vec::new(),
            description: String::new(),
            specification: String::new(),
            size: None,
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_price_sums_lines_at_catalog_prices() {
        let a = product(100);
        let b = product(50);
        let mut cart = Cart::default();
        cart.add(a.id, 2);
        cart.add(b.id, 1);
        let catalog = FakeCatalog {
            products: vec![a, b],
        };

        let priced = CartService::new(&catalog).price(&cart).await.expect("price");
        assert_eq!(priced.items.len(), 2);
        assert_eq!(priced.subtotal, Price::from_rupees(250));
        assert_eq!(priced.item_count, 3);
    }

    #[tokio::test]
    async fn test_price_drops_vanished_products() {
        let a = product(100);
        let mut cart = Cart::default();
        cart.add(a.id, 1);
        cart.add(ProductId::random(), 4);
        let catalog = FakeCatalog { products: vec![a] };

        let priced = CartService::new(&catalog).price(&cart).await.expect("price");
        assert_eq!(priced.items.len(), 1);
        assert_eq!(priced.subtotal, Price::from_rupees(100));
        assert_eq!(priced.item_count, 1);
    }

    #[tokio::test]
    async fn test_order_lines_snapshot_current_prices() {
        let a = product(75);
        let id = a.id;
        let mut cart = Cart::default();
        cart.add(id, 3);
        let catalog = FakeCatalog { products: vec![a] };

        let priced = CartService::new(&catalog).price(&cart).await.expect("price");
        let lines = order_lines(&priced);
        assert_eq!(lines.len(), 1);
        let line = lines.first().expect("one line");
        assert_eq!(line.product_id, id);
        assert_eq!(line.quantity, 3);
        assert_eq!(line.price_at_purchase, Price::from_rupees(75));
    }
}
