//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-step workflows (checkout,
//! cancellation, status changes, rating submission) inside one database
//! transaction. Work done through a [`TransactionContext`] is committed
//! when the closure returns `Ok` and rolled back otherwise.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{self as repo, *};
use crate::domain::{
    Address, Cart, Coupon, NewOrder, Order, OrderStatus, PaymentStatus, Product, Rating, User,
};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Tests implement it by hand over the generated repository mocks.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn addresses(&self) -> Arc<dyn AddressRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn subcategories(&self) -> Arc<dyn SubCategoryRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn carts(&self) -> Arc<dyn CartRepository>;

    fn wishlists(&self) -> Arc<dyn WishlistRepository>;

    fn coupons(&self) -> Arc<dyn CouponRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn ratings(&self) -> Arc<dyn RatingRepository>;

    fn settings(&self) -> Arc<dyn SettingsRepository>;

    /// Execute a closure within a read-committed transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise. Stock
    /// and coupon usage are guarded by conditional updates, so read-committed
    /// is enough for checkout.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn addresses(&self) -> TxAddressRepository<'_> {
        TxAddressRepository { txn: self.txn }
    }

    pub fn products(&self) -> TxProductRepository<'_> {
        TxProductRepository { txn: self.txn }
    }

    pub fn carts(&self) -> TxCartRepository<'_> {
        TxCartRepository { txn: self.txn }
    }

    pub fn coupons(&self) -> TxCouponRepository<'_> {
        TxCouponRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository { txn: self.txn }
    }

    pub fn ratings(&self) -> TxRatingRepository<'_> {
        TxRatingRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    addresses: Arc<AddressStore>,
    categories: Arc<CategoryStore>,
    subcategories: Arc<SubCategoryStore>,
    products: Arc<ProductStore>,
    carts: Arc<CartStore>,
    wishlists: Arc<WishlistStore>,
    coupons: Arc<CouponStore>,
    orders: Arc<OrderStore>,
    ratings: Arc<RatingStore>,
    settings: Arc<SettingsStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            addresses: Arc::new(AddressStore::new(db.clone())),
            categories: Arc::new(CategoryStore::new(db.clone())),
            subcategories: Arc::new(SubCategoryStore::new(db.clone())),
            products: Arc::new(ProductStore::new(db.clone())),
            carts: Arc::new(CartStore::new(db.clone())),
            wishlists: Arc::new(WishlistStore::new(db.clone())),
            coupons: Arc::new(CouponStore::new(db.clone())),
            orders: Arc::new(OrderStore::new(db.clone())),
            ratings: Arc::new(RatingStore::new(db.clone())),
            settings: Arc::new(SettingsStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // SQLite has no per-transaction isolation or access mode
        let (isolation, access_mode) = match self.db.get_database_backend() {
            sea_orm::DbBackend::Sqlite => (None, None),
            _ => (
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            ),
        };

        let txn = self
            .db
            .begin_with_config(isolation, access_mode)
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.addresses.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.categories.clone()
    }

    fn subcategories(&self) -> Arc<dyn SubCategoryRepository> {
        self.subcategories.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }

    fn wishlists(&self) -> Arc<dyn WishlistRepository> {
        self.wishlists.clone()
    }

    fn coupons(&self) -> Arc<dyn CouponRepository> {
        self.coupons.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn ratings(&self) -> Arc<dyn RatingRepository> {
        self.ratings.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsRepository> {
        self.settings.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(f).await
    }
}

// =============================================================================
// Transaction-aware repositories
// =============================================================================

pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        repo::find_user(self.txn, id).await
    }
}

pub struct TxAddressRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAddressRepository<'a> {
    pub async fn find(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Option<Address>> {
        repo::find_address(self.txn, user_id, address_id).await
    }
}

pub struct TxProductRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProductRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        repo::find_product(self.txn, id).await
    }

    /// Conditional decrement; `false` when stock is short
    pub async fn try_decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<bool> {
        repo::try_decrement_stock(self.txn, id, quantity).await
    }

    pub async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()> {
        repo::restock(self.txn, id, quantity).await
    }

    pub async fn set_avg_rating(&self, id: Uuid, avg_rating: i32) -> AppResult<()> {
        repo::set_avg_rating(self.txn, id, avg_rating).await
    }
}

pub struct TxCartRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCartRepository<'a> {
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Cart>> {
        repo::find_cart(self.txn, user_id).await
    }

    pub async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        repo::clear_cart(self.txn, user_id).await
    }
}

pub struct TxCouponRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCouponRepository<'a> {
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        repo::find_coupon_by_code(self.txn, code).await
    }

    /// Conditional increment; `false` when the usage limit is reached
    pub async fn try_increment_usage(&self, id: Uuid) -> AppResult<bool> {
        repo::try_increment_usage(self.txn, id).await
    }
}

pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub async fn create(&self, order: NewOrder) -> AppResult<Order> {
        repo::insert_order(self.txn, order).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        repo::find_order(self.txn, id).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        payment_status: Option<PaymentStatus>,
        tracking_number: Option<String>,
    ) -> AppResult<Order> {
        repo::update_order_status(self.txn, id, status, payment_status, tracking_number).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        repo::delete_order(self.txn, id).await
    }
}

pub struct TxRatingRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxRatingRepository<'a> {
    pub async fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        order_id: Uuid,
        rating: i32,
        review: Option<String>,
    ) -> AppResult<Rating> {
        repo::upsert_rating(self.txn, user_id, product_id, order_id, rating, review).await
    }

    pub async fn scores_for_product(&self, product_id: Uuid) -> AppResult<Vec<i32>> {
        repo::scores_for_product(self.txn, product_id).await
    }
}
