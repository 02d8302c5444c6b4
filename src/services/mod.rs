//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. Each one is a trait with a generic
//! implementation over [`UnitOfWork`](crate::infra::UnitOfWork), which
//! provides repository access and transactions.

mod auth_service;
mod cart_service;
mod catalog_service;
pub mod container;
mod coupon_service;
mod dashboard_service;
mod order_service;
mod rating_service;
mod settings_service;
mod user_service;
mod wishlist_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, AuthSession, Authenticator, Claims};
pub use cart_service::{CartManager, CartService};
pub use catalog_service::{CatalogManager, CatalogService};
pub use coupon_service::{CouponManager, CouponService};
pub use dashboard_service::{DashboardManager, DashboardService};
pub use order_service::{OrderManager, OrderService};
pub use rating_service::{RatingManager, RatingService};
pub use settings_service::{SettingsManager, SettingsService};
pub use user_service::{UserManager, UserService};
pub use wishlist_service::{WishlistManager, WishlistService};

// Parallel execution utilities
pub use container::parallel;
