//! Cart and wishlist repositories.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::catalog_repository::find_products;
use super::entities::cart::{self, Entity as CartEntity};
use super::entities::cart_item::{self, Entity as CartItemEntity};
use super::entities::wishlist_item::{self, Entity as WishlistEntity};
use crate::domain::{Cart, CartItem, Product};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's cart with its lines in insertion order
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Cart>>;

    /// Persist the cart header and replace its lines
    async fn save(&self, cart: Cart) -> AppResult<()>;

    /// Drop every line; a no-op when the user has no cart
    async fn clear(&self, user_id: Uuid) -> AppResult<()>;
}

pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_cart<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Option<Cart>> {
    let Some(header) = CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let items = CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(header.id))
        .order_by_asc(cart_item::Column::Position)
        .all(db)
        .await?;

    Ok(Some(Cart {
        id: header.id,
        user_id: header.user_id,
        items: items.into_iter().map(CartItem::from).collect(),
        updated_at: header.updated_at,
    }))
}

pub(crate) async fn save_cart<C: ConnectionTrait>(db: &C, cart: &Cart) -> AppResult<()> {
    let header = cart::ActiveModel {
        id: Set(cart.id),
        user_id: Set(cart.user_id),
        updated_at: Set(cart.updated_at),
    };
    CartEntity::insert(header)
        .on_conflict(
            OnConflict::column(cart::Column::Id)
                .update_column(cart::Column::UpdatedAt)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    CartItemEntity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(db)
        .await?;

    if cart.items.is_empty() {
        return Ok(());
    }

    let lines = cart
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            position: Set(position as i32),
        });
    CartItemEntity::insert_many(lines)
        .exec_without_returning(db)
        .await?;

    Ok(())
}

pub(crate) async fn clear_cart<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<()> {
    let Some(header) = CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(());
    };

    CartItemEntity::delete_many()
        .filter(cart_item::Column::CartId.eq(header.id))
        .exec(db)
        .await?;

    let mut active: cart::ActiveModel = header.into();
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    Ok(())
}

#[async_trait]
impl CartRepository for CartStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Cart>> {
        find_cart(&self.db, user_id).await
    }

    async fn save(&self, cart: Cart) -> AppResult<()> {
        // Header upsert and line replacement land together
        let txn = self.db.begin().await?;
        save_cart(&txn, &cart).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        clear_cart(&self.db, user_id).await
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Wishlisted products, most recently added first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Product>>;

    /// Idempotent insert
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()>;

    /// Idempotent delete
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()>;
}

pub struct WishlistStore {
    db: DatabaseConnection,
}

impl WishlistStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WishlistRepository for WishlistStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        let entries = WishlistEntity::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .order_by_desc(wishlist_item::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = entries.iter().map(|entry| entry.product_id).collect();
        let products = find_products(&self.db, ids.clone()).await?;

        Ok(ids
            .into_iter()
            .filter_map(|id| products.iter().find(|p| p.id == id).cloned())
            .collect())
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let entry = wishlist_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            created_at: Set(Utc::now()),
        };

        WishlistEntity::insert(entry)
            .on_conflict(
                OnConflict::columns([
                    wishlist_item::Column::UserId,
                    wishlist_item::Column::ProductId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        WishlistEntity::delete_many()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
