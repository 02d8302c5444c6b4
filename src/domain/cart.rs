//! Cart aggregate.
//!
//! A cart is a per-user list of (product, quantity) lines. Lines are unique
//! per product: adding an existing product increments its line in place.
//! Stock checks take the product's current stock as an argument so the
//! aggregate stays free of persistence concerns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::Product;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Empty cart for a user that has never added anything.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, product_id: Uuid) -> i32 {
        self.line(product_id).map_or(0, |item| item.quantity)
    }

    fn line(&self, product_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: Uuid) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.product_id == product_id)
    }

    /// Add `quantity` units, merging into an existing line.
    ///
    /// # Errors
    /// Rejects non-positive quantities and totals above `stock`; the cart
    /// is left untouched on error.
    pub fn add(&mut self, product_id: Uuid, quantity: i32, stock: i32) -> AppResult<()> {
        if quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }

        let wanted = self.quantity_of(product_id) + quantity;
        if wanted > stock {
            return Err(insufficient_stock(stock));
        }

        match self.line_mut(product_id) {
            Some(item) => item.quantity = wanted,
            None => self.items.push(CartItem { product_id, quantity }),
        }
        self.touch();
        Ok(())
    }

    /// Increment an existing line by one.
    pub fn increase(&mut self, product_id: Uuid, stock: i32) -> AppResult<()> {
        let current = self
            .line(product_id)
            .map(|item| item.quantity)
            .ok_or_else(|| AppError::not_found("Cart item"))?;

        if current + 1 > stock {
            return Err(insufficient_stock(stock));
        }

        if let Some(item) = self.line_mut(product_id) {
            item.quantity += 1;
        }
        self.touch();
        Ok(())
    }

    /// Decrement an existing line by one, dropping it at zero.
    pub fn decrease(&mut self, product_id: Uuid) -> AppResult<()> {
        let item = self
            .line_mut(product_id)
            .ok_or_else(|| AppError::not_found("Cart item"))?;

        if item.quantity <= 1 {
            self.items.retain(|item| item.product_id != product_id);
        } else {
            item.quantity -= 1;
        }
        self.touch();
        Ok(())
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn insufficient_stock(stock: i32) -> AppError {
    AppError::validation(format!(
        "Cannot add more items than available stock. Only {} left",
        stock
    ))
}

/// Add-to-cart payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Cart line joined with its product
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
    pub line_total: f64,
}

/// Populated cart returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    pub total_items: i32,
    pub subtotal: f64,
}

impl CartView {
    /// Join cart lines with loaded products. Lines whose product no longer
    /// exists are skipped.
    pub fn assemble(user_id: Uuid, items: &[CartItem], products: Vec<Product>) -> Self {
        let lines: Vec<CartLine> = items
            .iter()
            .filter_map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|product| CartLine {
                        line_total: product.price * f64::from(item.quantity),
                        product: product.clone(),
                        quantity: item.quantity,
                    })
            })
            .collect();

        Self {
            user_id,
            total_items: lines.iter().map(|line| line.quantity).sum(),
            subtotal: lines.iter().map(|line| line.line_total).sum(),
            items: lines,
        }
    }

    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total_items: 0,
            subtotal: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_existing_line() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(product, 2, 10).unwrap();
        cart.add(product, 3, 10).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of(product), 5);
    }

    #[test]
    fn test_add_beyond_stock_leaves_cart_unchanged() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(product, 4, 5).unwrap();
        let before = cart.clone();

        let err = cart.add(product, 2, 5).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(cart.items, before.items);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut cart = Cart::new(Uuid::new_v4());
        assert!(cart.add(Uuid::new_v4(), 0, 5).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increase_respects_stock() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(product, 2, 3).unwrap();
        cart.increase(product, 3).unwrap();
        assert_eq!(cart.quantity_of(product), 3);

        assert!(cart.increase(product, 3).is_err());
        assert_eq!(cart.quantity_of(product), 3);
    }

    #[test]
    fn test_increase_missing_line() {
        let mut cart = Cart::new(Uuid::new_v4());
        let err = cart.increase(Uuid::new_v4(), 10).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_decrease_removes_line_at_zero() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(product, 2, 10).unwrap();
        cart.decrease(product).unwrap();
        assert_eq!(cart.quantity_of(product), 1);
        cart.decrease(product).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(product, 1, 10).unwrap();
        assert!(cart.remove(product));
        assert!(!cart.remove(product));
        assert!(cart.is_empty());
    }
}
