//! Repository layer - Data access abstraction
//!
//! One trait per aggregate with a SeaORM-backed `*Store` implementation.
//! Queries that must also run inside a transaction are free functions
//! generic over `ConnectionTrait`, shared with the transactional
//! repositories in `unit_of_work`.

mod cart_repository;
mod catalog_repository;
mod coupon_repository;
pub(crate) mod entities;
mod order_repository;
mod rating_repository;
mod settings_repository;
mod user_repository;

pub(crate) use cart_repository::{clear_cart, find_cart};
pub(crate) use catalog_repository::{
    find_product, restock, set_avg_rating, try_decrement_stock,
};
pub(crate) use coupon_repository::{find_coupon_by_code, try_increment_usage};
pub(crate) use order_repository::{delete_order, find_order, insert_order, update_order_status};
pub(crate) use rating_repository::{scores_for_product, upsert_rating};
pub(crate) use user_repository::{find_address, find_user};

pub use cart_repository::{CartRepository, CartStore, WishlistRepository, WishlistStore};
pub use catalog_repository::{
    CategoryRepository, CategoryStore, ProductRepository, ProductStore, SubCategoryRepository,
    SubCategoryStore,
};
pub use coupon_repository::{CouponRepository, CouponStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use rating_repository::{RatingRepository, RatingStore};
pub use settings_repository::{SettingsRepository, SettingsStore};
pub use user_repository::{AddressRepository, AddressStore, UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use cart_repository::{MockCartRepository, MockWishlistRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_repository::{
    MockCategoryRepository, MockProductRepository, MockSubCategoryRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use coupon_repository::MockCouponRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use rating_repository::MockRatingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use settings_repository::MockSettingsRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::{MockAddressRepository, MockUserRepository};
