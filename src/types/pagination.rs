//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Pagination query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Zero-based page index, clamped to `MAX_PAGE_NUMBER`
    pub fn page_index(&self) -> u64 {
        self.page.clamp(1, MAX_PAGE_NUMBER) - 1
    }

    /// Row offset of the page; never overflows
    pub fn offset(&self) -> u64 {
        self.page_index() * self.limit()
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(ProductPage = Paginated<crate::domain::Product>)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Build a page from the items and the total row count.
    pub fn new(data: Vec<T>, params: PaginationParams, total: u64) -> Self {
        let per_page = params.limit();
        Self {
            data,
            meta: PaginationMeta {
                page: params.page.max(1),
                per_page,
                total,
                total_pages: total.div_ceil(per_page),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_uses_capped_limit() {
        let params = PaginationParams { page: 3, per_page: 500 };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 2 * MAX_PAGE_SIZE);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let params = PaginationParams {
            page: u64::MAX,
            per_page: u64::MAX,
        };
        assert_eq!(params.page_index(), MAX_PAGE_NUMBER - 1);
        assert_eq!(params.offset(), (MAX_PAGE_NUMBER - 1) * MAX_PAGE_SIZE);
        assert_eq!(PaginationParams { page: 0, per_page: 10 }.page_index(), 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2], PaginationParams { page: 1, per_page: 2 }, 5);
        assert_eq!(page.meta.total_pages, 3);
        let empty: Paginated<i32> = Paginated::new(vec![], PaginationParams::default(), 0);
        assert_eq!(empty.meta.total_pages, 0);
    }
}
