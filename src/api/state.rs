//! Application state - Dependency injection container.
//!
//! Handlers and middleware reach every service through trait objects held
//! here, including the settings provider used by the maintenance gate.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, CartService, CatalogService, CouponService, DashboardService, OrderService,
    RatingService, ServiceContainer, Services, SettingsService, UserService, WishlistService,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub cart_service: Arc<dyn CartService>,
    pub wishlist_service: Arc<dyn WishlistService>,
    pub coupon_service: Arc<dyn CouponService>,
    pub order_service: Arc<dyn OrderService>,
    pub rating_service: Arc<dyn RatingService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    pub settings_service: Arc<dyn SettingsService>,
    /// Cookie attributes depend on the environment
    pub config: Arc<Config>,
    /// Database handle for health checks
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the production service graph over `database`.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config.clone());
        Self::new(&container, database, config)
    }

    /// Create application state from any service container.
    pub fn new(services: &dyn ServiceContainer, database: Arc<Database>, config: Config) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            catalog_service: services.catalog(),
            cart_service: services.carts(),
            wishlist_service: services.wishlists(),
            coupon_service: services.coupons(),
            order_service: services.orders(),
            rating_service: services.ratings(),
            dashboard_service: services.dashboard(),
            settings_service: services.settings(),
            config: Arc::new(config),
            database,
        }
    }
}
