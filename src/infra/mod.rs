//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection, pooling and migrations
//! - SeaORM repositories for every aggregate
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    AddressRepository, CartRepository, CategoryRepository, CouponRepository, OrderRepository,
    ProductRepository, RatingRepository, SettingsRepository, SubCategoryRepository,
    UserRepository, WishlistRepository,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxAddressRepository, TxCartRepository, TxCouponRepository,
    TxOrderRepository, TxProductRepository, TxRatingRepository, TxUserRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAddressRepository, MockCartRepository, MockCategoryRepository, MockCouponRepository,
    MockOrderRepository, MockProductRepository, MockRatingRepository, MockSettingsRepository,
    MockSubCategoryRepository, MockUserRepository, MockWishlistRepository,
};
