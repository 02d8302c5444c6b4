//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, cart_handler, catalog_handler, coupon_handler, order_handler,
    rating_handler, settings_handler, user_handler, wishlist_handler,
};
use crate::domain::{
    AddToCart, Address, AddressInput, CartLine, CartView, Category, CategoryInput, Coupon,
    CouponCheck, CouponInput, CouponQuote, CouponUpdate, DashboardStats, DiscountType, Order,
    OrderItem, OrderStatus, PaymentStatus, PlaceOrder, Product, ProductInput, ProductReview,
    ProductSort, ProductUpdate, Rating, RatingEligibility, Settings, SettingsUpdate,
    ShippingAddress, StatusCount, SubCategory, SubCategoryInput, SubmitRating,
    UpdateOrderStatus, UpdateProfile, UserResponse, UserRole,
};
use crate::services::AuthSession;
use crate::types::{MessageResponse, PaginationMeta, ProductPage};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "E-commerce backend: catalog, carts, checkout, coupons, ratings and store administration"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        auth_handler::signup,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        user_handler::update_profile,
        user_handler::change_password,
        user_handler::list_addresses,
        user_handler::add_address,
        user_handler::update_address,
        user_handler::delete_address,
        catalog_handler::list_products,
        catalog_handler::get_product,
        catalog_handler::create_product,
        catalog_handler::list_categories,
        catalog_handler::get_category,
        catalog_handler::create_category,
        catalog_handler::list_subcategories,
        catalog_handler::get_subcategory,
        catalog_handler::create_subcategory,
        cart_handler::add_to_cart,
        cart_handler::get_cart,
        cart_handler::increase_quantity,
        cart_handler::decrease_quantity,
        cart_handler::remove_item,
        cart_handler::clear_cart,
        wishlist_handler::list_wishlist,
        wishlist_handler::add_to_wishlist,
        wishlist_handler::remove_from_wishlist,
        order_handler::place_order,
        order_handler::my_orders,
        order_handler::get_order,
        order_handler::cancel_order,
        order_handler::delete_order,
        rating_handler::submit_rating,
        rating_handler::product_ratings,
        rating_handler::my_ratings,
        rating_handler::can_rate,
        coupon_handler::validate_coupon,
        coupon_handler::apply_coupon,
        coupon_handler::list_coupons,
        coupon_handler::create_coupon,
        coupon_handler::get_coupon,
        coupon_handler::update_coupon,
        coupon_handler::delete_coupon,
        admin_handler::dashboard,
        admin_handler::list_users,
        admin_handler::update_user_role,
        admin_handler::delete_user,
        admin_handler::create_product,
        admin_handler::update_product,
        admin_handler::delete_product,
        admin_handler::create_category,
        admin_handler::update_category,
        admin_handler::delete_category,
        admin_handler::create_subcategory,
        admin_handler::update_subcategory,
        admin_handler::delete_subcategory,
        admin_handler::list_orders,
        admin_handler::get_order,
        admin_handler::update_order_status,
        admin_handler::delete_order,
        settings_handler::get_settings,
        settings_handler::update_settings,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            UpdateProfile,
            Address,
            AddressInput,
            AuthSession,
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            user_handler::ChangePasswordRequest,
            Category,
            CategoryInput,
            SubCategory,
            SubCategoryInput,
            Product,
            ProductInput,
            ProductUpdate,
            ProductSort,
            ProductPage,
            PaginationMeta,
            AddToCart,
            CartLine,
            CartView,
            wishlist_handler::WishlistRequest,
            Order,
            OrderItem,
            OrderStatus,
            PaymentStatus,
            ShippingAddress,
            PlaceOrder,
            UpdateOrderStatus,
            Rating,
            ProductReview,
            SubmitRating,
            RatingEligibility,
            rating_handler::ProductRatings,
            Coupon,
            DiscountType,
            CouponInput,
            CouponUpdate,
            CouponCheck,
            CouponQuote,
            DashboardStats,
            StatusCount,
            admin_handler::UpdateRoleRequest,
            Settings,
            SettingsUpdate,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login and sessions"),
        (name = "Users", description = "Profile and address book"),
        (name = "Catalog", description = "Products, categories and subcategories"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Wishlist", description = "Saved products"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Ratings", description = "Product ratings and reviews"),
        (name = "Coupons", description = "Discount codes"),
        (name = "Admin", description = "Store administration"),
        (name = "Settings", description = "Store-wide settings")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT from /api/auth/login; the `token` cookie is accepted as well",
                        ))
                        .build(),
                ),
            );
        }
    }
}
