//! Shared response and paging types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginationMeta, PaginationParams, ProductPage};
pub use response::{Created, MessageResponse, NoContent};
