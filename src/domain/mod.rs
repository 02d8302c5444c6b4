//! Domain layer - Core business entities and rules
//!
//! Storefront aggregates and the pure rules that govern them (coupon
//! discounts, cart stock checks, order status transitions, rating averages).
//! Nothing here touches the database; services feed the rules with loaded
//! state and persist the outcome.

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod dashboard;
pub mod order;
pub mod password;
pub mod rating;
pub mod settings;
pub mod user;

pub use cart::{AddToCart, Cart, CartItem, CartLine, CartView};
pub use catalog::{
    Category, CategoryInput, Product, ProductFilter, ProductInput, ProductListQuery, ProductSort,
    ProductUpdate, SubCategory, SubCategoryInput,
};
pub use coupon::{
    Coupon, CouponCheck, CouponInput, CouponQuote, CouponUpdate, CouponValidation, DiscountType,
};
pub use dashboard::{DashboardStats, StatusCount};
pub use order::{
    NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, PlaceOrder, ShippingAddress,
    StatusTransition, UpdateOrderStatus,
};
pub use password::Password;
pub use rating::{ProductReview, Rating, RatingEligibility, SubmitRating};
pub use settings::{Settings, SettingsUpdate};
pub use user::{
    Address, AddressInput, NewUser, UpdateProfile, User, UserResponse, UserRole,
};
