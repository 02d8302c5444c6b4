//! Service Container - Centralized service access with parallel execution support.
//!
//! Every service is built over one shared [`Persistence`] unit of work and
//! handed out as a trait object, so handlers only ever see the traits.

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, Authenticator, CartManager, CartService, CatalogManager, CatalogService,
    CouponManager, CouponService, DashboardManager, DashboardService, OrderManager, OrderService,
    RatingManager, RatingService, SettingsManager, SettingsService, UserManager, UserService,
    WishlistManager, WishlistService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn wishlists(&self) -> Arc<dyn WishlistService>;

    fn coupons(&self) -> Arc<dyn CouponService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn ratings(&self) -> Arc<dyn RatingService>;

    fn dashboard(&self) -> Arc<dyn DashboardService>;

    fn settings(&self) -> Arc<dyn SettingsService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    catalog_service: Arc<dyn CatalogService>,
    cart_service: Arc<dyn CartService>,
    wishlist_service: Arc<dyn WishlistService>,
    coupon_service: Arc<dyn CouponService>,
    order_service: Arc<dyn OrderService>,
    rating_service: Arc<dyn RatingService>,
    dashboard_service: Arc<dyn DashboardService>,
    settings_service: Arc<dyn SettingsService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            catalog_service: Arc::new(CatalogManager::new(uow.clone())),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            wishlist_service: Arc::new(WishlistManager::new(uow.clone())),
            coupon_service: Arc::new(CouponManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(uow.clone())),
            rating_service: Arc::new(RatingManager::new(uow.clone())),
            dashboard_service: Arc::new(DashboardManager::new(uow.clone())),
            settings_service: Arc::new(SettingsManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn wishlists(&self) -> Arc<dyn WishlistService> {
        self.wishlist_service.clone()
    }

    fn coupons(&self) -> Arc<dyn CouponService> {
        self.coupon_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn ratings(&self) -> Arc<dyn RatingService> {
        self.rating_service.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardService> {
        self.dashboard_service.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsService> {
        self.settings_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute four independent async operations in parallel.
    pub async fn join4<F1, F2, F3, F4, T1, T2, T3, T4>(
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
    ) -> AppResult<(T1, T2, T3, T4)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
        F4: Future<Output = AppResult<T4>>,
    {
        try_join!(f1, f2, f3, f4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<&'static str> {
            Ok("two")
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "two");
    }

    #[tokio::test]
    async fn test_parallel_join4_fails_fast() {
        async fn ok(n: u64) -> AppResult<u64> {
            Ok(n)
        }
        async fn fail() -> AppResult<u64> {
            Err(AppError::internal("count failed"))
        }

        let result = parallel::join4(ok(1), ok(2), fail(), ok(4)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
