//! Cart service.
//!
//! Every mutation loads the cart, applies the domain rule and saves it back,
//! so a rejected change leaves the stored cart untouched.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Cart, CartItem, CartView};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CartService: Send + Sync {
    /// The cart with current product data; empty when none exists yet
    async fn get(&self, user_id: Uuid) -> AppResult<CartView>;

    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartView>;

    async fn increase(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView>;

    async fn decrease(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView>;

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView>;

    async fn clear(&self, user_id: Uuid) -> AppResult<()>;
}

pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn existing_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        self.uow
            .carts()
            .find_by_user(user_id)
            .await?
            .ok_or_not_found("Cart")
    }

    async fn current_stock(&self, product_id: Uuid) -> AppResult<i32> {
        let product = self
            .uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_not_found("Product")?;
        Ok(product.stock)
    }

    async fn save_and_view(&self, cart: Cart) -> AppResult<CartView> {
        let user_id = cart.user_id;
        let items = cart.items.clone();
        self.uow.carts().save(cart).await?;
        self.view(user_id, &items).await
    }

    async fn view(&self, user_id: Uuid, items: &[CartItem]) -> AppResult<CartView> {
        if items.is_empty() {
            return Ok(CartView::empty(user_id));
        }
        let ids = items.iter().map(|item| item.product_id).collect();
        let products = self.uow.products().find_many(ids).await?;
        Ok(CartView::assemble(user_id, items, products))
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn get(&self, user_id: Uuid) -> AppResult<CartView> {
        match self.uow.carts().find_by_user(user_id).await? {
            Some(cart) => self.view(user_id, &cart.items).await,
            None => Ok(CartView::empty(user_id)),
        }
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartView> {
        if quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }
        let stock = self.current_stock(product_id).await?;

        let mut cart = self
            .uow
            .carts()
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id));
        cart.add(product_id, quantity, stock)?;

        self.save_and_view(cart).await
    }

    async fn increase(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView> {
        let mut cart = self.existing_cart(user_id).await?;
        let stock = self.current_stock(product_id).await?;
        cart.increase(product_id, stock)?;
        self.save_and_view(cart).await
    }

    async fn decrease(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView> {
        let mut cart = self.existing_cart(user_id).await?;
        cart.decrease(product_id)?;
        self.save_and_view(cart).await
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView> {
        let Some(mut cart) = self.uow.carts().find_by_user(user_id).await? else {
            return Ok(CartView::empty(user_id));
        };
        if cart.remove(product_id) {
            return self.save_and_view(cart).await;
        }
        self.view(user_id, &cart.items).await
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        self.uow.carts().clear(user_id).await
    }
}
