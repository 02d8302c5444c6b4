//! Service unit tests over mocked repositories.
//!
//! Requires the `test-utils` feature for the generated mocks:
//! `cargo test --features test-utils`.

#![cfg(feature = "test-utils")]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::predicate::eq;
use uuid::Uuid;

use storefront::config::Config;
use storefront::domain::{Coupon, DiscountType, Settings, User, UserRole};
use storefront::errors::{AppError, AppResult};
use storefront::infra::{
    AddressRepository, CartRepository, CategoryRepository, CouponRepository,
    MockAddressRepository, MockCartRepository, MockCategoryRepository, MockCouponRepository,
    MockOrderRepository, MockProductRepository, MockRatingRepository, MockSettingsRepository,
    MockSubCategoryRepository, MockUserRepository, MockWishlistRepository, OrderRepository,
    ProductRepository, RatingRepository, SettingsRepository, SubCategoryRepository,
    TransactionContext, UnitOfWork, UserRepository, WishlistRepository,
};
use storefront::services::{
    AuthService, Authenticator, CouponManager, CouponService, SettingsManager, SettingsService,
    UserManager, UserService, WishlistManager, WishlistService,
};

fn test_user(id: Uuid, role: UserRole) -> User {
    User {
        id,
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        password_hash: "hashed".to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_coupon(code: &str, usage_limit: i32, used_count: i32) -> Coupon {
    Coupon {
        id: Uuid::new_v4(),
        code: code.to_string(),
        discount_type: DiscountType::Percentage,
        discount_amount: Some(10.0),
        minimum_amount: 0.0,
        usage_limit,
        used_count,
        is_active: true,
        expiry_date: Utc::now() + Duration::days(7),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Repository mocks; anything left unconfigured panics when called.
#[derive(Default)]
struct Mocks {
    users: MockUserRepository,
    addresses: MockAddressRepository,
    categories: MockCategoryRepository,
    subcategories: MockSubCategoryRepository,
    products: MockProductRepository,
    carts: MockCartRepository,
    wishlists: MockWishlistRepository,
    coupons: MockCouponRepository,
    orders: MockOrderRepository,
    ratings: MockRatingRepository,
    settings: MockSettingsRepository,
}

impl Mocks {
    fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            users: Arc::new(self.users),
            addresses: Arc::new(self.addresses),
            categories: Arc::new(self.categories),
            subcategories: Arc::new(self.subcategories),
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            wishlists: Arc::new(self.wishlists),
            coupons: Arc::new(self.coupons),
            orders: Arc::new(self.orders),
            ratings: Arc::new(self.ratings),
            settings: Arc::new(self.settings),
        })
    }
}

/// Test UnitOfWork handing out the mocked repositories
struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    addresses: Arc<MockAddressRepository>,
    categories: Arc<MockCategoryRepository>,
    subcategories: Arc<MockSubCategoryRepository>,
    products: Arc<MockProductRepository>,
    carts: Arc<MockCartRepository>,
    wishlists: Arc<MockWishlistRepository>,
    coupons: Arc<MockCouponRepository>,
    orders: Arc<MockOrderRepository>,
    ratings: Arc<MockRatingRepository>,
    settings: Arc<MockSettingsRepository>,
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
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

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Transactional workflows are covered by the SQLite tests
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

fn authenticator(mocks: Mocks) -> Authenticator<TestUnitOfWork> {
    Authenticator::new(mocks.into_uow(), Config::for_testing("service-test-secret"))
}

#[tokio::test]
async fn test_signup_rejected_when_registration_closed() {
    let mut mocks = Mocks::default();
    mocks.settings.expect_get_or_create().returning(|| {
        Ok(Settings {
            allow_registration: false,
            ..Settings::default()
        })
    });
    mocks.users.expect_find_by_email().never();

    let result = authenticator(mocks)
        .signup(
            "Shopper".to_string(),
            "new@example.com".to_string(),
            "correct-horse-battery".to_string(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "Registration is currently disabled"));
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let mut mocks = Mocks::default();
    mocks
        .settings
        .expect_get_or_create()
        .returning(|| Ok(Settings::default()));
    mocks
        .users
        .expect_find_by_email()
        .withf(|email| email.to_string() == "taken@example.com")
        .returning(|_| Ok(Some(test_user(Uuid::new_v4(), UserRole::User))));
    mocks.users.expect_create().never();

    let result = authenticator(mocks)
        .signup(
            "Shopper".to_string(),
            "  Taken@Example.com ".to_string(),
            "correct-horse-battery".to_string(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_login_unknown_email_is_invalid_credentials() {
    let mut mocks = Mocks::default();
    mocks.users.expect_find_by_email().returning(|_| Ok(None));

    let result = authenticator(mocks)
        .login("ghost@example.com".to_string(), "whatever123".to_string())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let admin_id = Uuid::new_v4();
    let mut mocks = Mocks::default();
    mocks.users.expect_update_role().never();

    let service = UserManager::new(mocks.into_uow());
    let result = service.update_role(admin_id, admin_id, UserRole::User).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_update_role_promotes_other_user() {
    let admin_id = Uuid::new_v4();
    let target = Uuid::new_v4();
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_find_by_id()
        .with(eq(target))
        .returning(|id| Ok(Some(test_user(id, UserRole::User))));
    mocks
        .users
        .expect_update_role()
        .with(eq(target), eq(UserRole::Admin))
        .times(1)
        .returning(|id, role| Ok(test_user(id, role)));

    let service = UserManager::new(mocks.into_uow());
    let user = service
        .update_role(admin_id, target, UserRole::Admin)
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Admin);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let admin_id = Uuid::new_v4();
    let mut mocks = Mocks::default();
    mocks.users.expect_delete().never();

    let service = UserManager::new(mocks.into_uow());
    let result = service.delete_user(admin_id, admin_id).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_validate_unknown_coupon_code() {
    let mut mocks = Mocks::default();
    mocks
        .coupons
        .expect_find_by_code()
        .withf(|code| code.to_string() == "NOPE")
        .returning(|_| Ok(None));

    let service = CouponManager::new(mocks.into_uow());
    let result = service.validate("nope", 100.0).await;

    assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Invalid coupon code"));
}

#[tokio::test]
async fn test_validate_quotes_percentage_discount() {
    let mut mocks = Mocks::default();
    mocks
        .coupons
        .expect_find_by_code()
        .returning(|code| Ok(Some(test_coupon(code, 5, 0))));
    mocks.coupons.expect_try_increment_usage().never();

    let service = CouponManager::new(mocks.into_uow());
    let quote = service.validate("SAVE10", 250.0).await.unwrap();

    assert!(quote.valid);
    assert_eq!(quote.discount, 25.0);
    assert_eq!(quote.final_amount, 225.0);
}

#[tokio::test]
async fn test_apply_loses_race_for_last_use() {
    let mut mocks = Mocks::default();
    mocks
        .coupons
        .expect_find_by_code()
        .returning(|code| Ok(Some(test_coupon(code, 1, 0))));
    mocks
        .coupons
        .expect_try_increment_usage()
        .times(1)
        .returning(|_| Ok(false));

    let service = CouponManager::new(mocks.into_uow());
    let result = service.apply("SAVE10", 100.0).await;

    assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Coupon usage limit reached"));
}

#[tokio::test]
async fn test_apply_exhausted_coupon_never_increments() {
    let mut mocks = Mocks::default();
    mocks
        .coupons
        .expect_find_by_code()
        .returning(|code| Ok(Some(test_coupon(code, 2, 2))));
    mocks.coupons.expect_try_increment_usage().never();

    let service = CouponManager::new(mocks.into_uow());
    let result = service.apply("SAVE10", 100.0).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_wishlist_add_missing_product() {
    let mut mocks = Mocks::default();
    mocks.products.expect_find_by_id().returning(|_| Ok(None));
    mocks.wishlists.expect_add().never();

    let service = WishlistManager::new(mocks.into_uow());
    let result = service.add(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_maintenance_flag_reads_settings() {
    let mut mocks = Mocks::default();
    mocks.settings.expect_get_or_create().returning(|| {
        Ok(Settings {
            maintenance_mode: true,
            ..Settings::default()
        })
    });

    let service = SettingsManager::new(mocks.into_uow());
    assert!(service.is_maintenance_mode().await.unwrap());
}
