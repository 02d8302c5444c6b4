use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Product;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait WishlistService: Send + Sync {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Product>>;

    /// Adding a product twice is a no-op
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Vec<Product>>;

    /// Removing an absent product is a no-op
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Vec<Product>>;
}

pub struct WishlistManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> WishlistManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> WishlistService for WishlistManager<U> {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        self.uow.wishlists().list(user_id).await
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Vec<Product>> {
        self.uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_not_found("Product")?;

        self.uow.wishlists().add(user_id, product_id).await?;
        self.list(user_id).await
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Vec<Product>> {
        self.uow.wishlists().remove(user_id, product_id).await?;
        self.list(user_id).await
    }
}
