//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod cart_handler;
pub mod catalog_handler;
pub mod coupon_handler;
pub mod order_handler;
pub mod rating_handler;
pub mod settings_handler;
pub mod user_handler;
pub mod wishlist_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use cart_handler::cart_routes;
pub use catalog_handler::{category_routes, product_routes, subcategory_routes};
pub use coupon_handler::coupon_routes;
pub use order_handler::order_routes;
pub use rating_handler::rating_routes;
pub use settings_handler::settings_routes;
pub use user_handler::user_routes;
pub use wishlist_handler::wishlist_routes;
