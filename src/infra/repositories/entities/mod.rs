//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Enumerations are stored as lowercase strings and parsed on the way out.

pub mod address;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod coupon;
pub mod order;
pub mod order_item;
pub mod product;
pub mod rating;
pub mod settings;
pub mod subcategory;
pub mod user;
pub mod wishlist_item;
