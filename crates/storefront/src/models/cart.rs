//! Session-resident cart types.
//!
//! The cart lives in the tower-sessions store as a plain list of
//! (product, quantity) lines; it is priced against the current catalog on
//! every read. Prices are only snapshotted when checkout turns the cart
//! into an order.

use serde::{Deserialize, Serialize};

use craftloom_core::{Price, ProductId};

use super::product::Product;

/// One cart line: a product reference and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The session cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add a quantity of a product, merging with an existing line.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity,
            });
        }
    }

    /// Set the quantity of a product's line. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity,
            });
        }
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total item count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A cart line priced against the current catalog.
#[derive(Debug, Clone, Serialize)]
pub struct PricedCartItem {
    /// The product, at its current catalog price.
    pub product: Product,
    /// Quantity in the cart.
    pub quantity: u32,
    /// `product.price * quantity`.
    pub line_total: Price,
}

/// The cart priced for display.
#[derive(Debug, Clone, Serialize)]
pub struct PricedCart {
    pub items: Vec<PricedCartItem>,
    /// Sum of line totals at current catalog prices.
    pub subtotal: Price,
    /// Total item count.
    pub item_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_lines() {
        let product = ProductId::random();
        let mut cart = Cart::default();
        cart.add(product, 1);
        cart.add(product, 2);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::default();
        cart.add(ProductId::random(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let product = ProductId::random();
        let mut cart = Cart::default();
        cart.add(product, 2);
        cart.set_quantity(product, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_keeps_other_lines() {
        let keep = ProductId::random();
        let drop = ProductId::random();
        let mut cart = Cart::default();
        cart.add(keep, 1);
        cart.add(drop, 1);
        cart.remove(drop);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines.first().map(|l| l.product_id), Some(keep));
    }
}
