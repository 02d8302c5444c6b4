//! Shared fixtures: the real service graph over a migrated in-memory SQLite
//! database.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use storefront::api::{create_router, AppState};
use storefront::config::Config;
use storefront::domain::{
    Address, AddressInput, Category, CategoryInput, Coupon, CouponInput, DiscountType, Product,
    ProductInput, User,
};
use storefront::infra::Database;
use storefront::services::{ServiceContainer, Services};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub services: Services,
    pub database: Arc<Database>,
    pub config: Config,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::for_testing(TEST_SECRET)).await
    }

    pub async fn with_config(config: Config) -> Self {
        let database = Database::connect(&config)
            .await
            .expect("in-memory database with migrations");
        let services = Services::from_connection(database.get_connection(), config.clone());

        Self {
            services,
            database: Arc::new(database),
            config,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(&self.services, self.database.clone(), self.config.clone())
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state())
    }

    pub async fn customer(&self, email: &str) -> User {
        let session = self
            .services
            .auth()
            .signup("Shopper".to_string(), email.to_string(), PASSWORD.to_string())
            .await
            .expect("signup");
        self.services.users().get_user(session.user.id).await.expect("user")
    }

    pub async fn admin(&self) -> User {
        self.services
            .users()
            .bootstrap_admin(
                "Admin".to_string(),
                "admin@example.com".to_string(),
                PASSWORD.to_string(),
            )
            .await
            .expect("admin")
    }

    pub fn token_for(&self, user: &User) -> String {
        self.services
            .auth()
            .issue_token(user.id, user.role)
            .expect("token")
    }

    pub async fn address(&self, user: &User) -> Address {
        self.services
            .users()
            .add_address(
                user.id,
                AddressInput {
                    street: "1 Market Street".to_string(),
                    city: "Pune".to_string(),
                    state: "MH".to_string(),
                    country: "India".to_string(),
                    zip: "411001".to_string(),
                },
            )
            .await
            .expect("address")
    }

    pub async fn category(&self, name: &str) -> Category {
        self.services
            .catalog()
            .create_category(CategoryInput {
                name: name.to_string(),
                description: None,
            })
            .await
            .expect("category")
    }

    pub async fn product(&self, category: &Category, name: &str, price: f64, stock: i32) -> Product {
        self.services
            .catalog()
            .create_product(ProductInput {
                name: name.to_string(),
                description: format!("{} description", name),
                price,
                stock,
                is_bestseller: false,
                image_url: None,
                major_category_id: category.id,
                sub_category_id: None,
            })
            .await
            .expect("product")
    }

    pub async fn stock_of(&self, product_id: Uuid) -> i32 {
        self.services
            .catalog()
            .get_product(product_id)
            .await
            .expect("product")
            .stock
    }

    pub async fn coupon(
        &self,
        code: &str,
        discount_type: DiscountType,
        discount_amount: Option<f64>,
        minimum_amount: f64,
        usage_limit: i32,
    ) -> Coupon {
        self.services
            .coupons()
            .create(CouponInput {
                code: code.to_string(),
                discount_type,
                discount_amount,
                minimum_amount,
                usage_limit,
                is_active: true,
                expiry_date: Utc::now() + Duration::days(30),
            })
            .await
            .expect("coupon")
    }
}
