//! Catalog entities: categories, subcategories and products.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::config::{
    DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, NEW_ARRIVAL_WINDOW_DAYS,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Top-level product category
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category create/update payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    #[schema(example = "Electronics")]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Second-level category, always owned by a category
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subcategory create/update payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Subcategory name is required"))]
    #[schema(example = "Headphones")]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub category_id: Uuid,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(example = 49.99)]
    pub price: f64,
    pub stock: i32,
    pub is_bestseller: bool,
    /// Rounded mean of all ratings, 0 when unrated
    pub avg_rating: i32,
    pub image_url: Option<String>,
    pub major_category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }
}

/// Product create payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    #[schema(example = "Wireless Headphones")]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub is_bestseller: bool,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    pub major_category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
}

/// Partial product update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200, message = "Product name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub is_bestseller: Option<bool>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    pub major_category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
}

/// Listing sort orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductSort {
    /// Price, lowest first
    Asc,
    /// Price, highest first
    Desc,
    Newest,
    Rating,
}

/// Raw product listing query string
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Case-insensitive match against name and description
    pub search_query: Option<String>,
    pub sort_order: Option<ProductSort>,
    pub bestsellers: Option<bool>,
    pub new_arrivals: Option<bool>,
    /// Comma-separated category ids
    pub major_categories: Option<String>,
    /// Comma-separated subcategory ids
    pub sub_categories: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Parsed product filter handed to the repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
    pub bestsellers_only: bool,
    pub created_after: Option<DateTime<Utc>>,
    pub category_ids: Vec<Uuid>,
    pub subcategory_ids: Vec<Uuid>,
}

impl ProductListQuery {
    /// Parse the raw query into a filter and pagination window.
    pub fn into_filter(self, now: DateTime<Utc>) -> AppResult<(ProductFilter, PaginationParams)> {
        let filter = ProductFilter {
            search: self
                .search_query
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
            sort: self.sort_order,
            bestsellers_only: self.bestsellers.unwrap_or(false),
            created_after: self
                .new_arrivals
                .unwrap_or(false)
                .then(|| now - Duration::days(NEW_ARRIVAL_WINDOW_DAYS)),
            category_ids: parse_id_list(self.major_categories.as_deref(), "category")?,
            subcategory_ids: parse_id_list(self.sub_categories.as_deref(), "subcategory")?,
        };

        let page = self.page.unwrap_or(DEFAULT_PAGE_NUMBER).max(1);
        if page > MAX_PAGE_NUMBER {
            return Err(AppError::BadRequest(format!(
                "page must not exceed {}",
                MAX_PAGE_NUMBER
            )));
        }

        let pagination = PaginationParams {
            page,
            per_page: self.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        };

        Ok((filter, pagination))
    }
}

/// Parse a comma-separated id list, ignoring empty segments.
fn parse_id_list(raw: Option<&str>, what: &str) -> AppResult<Vec<Uuid>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid {} id: {}", what, s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_yields_default_filter() {
        let (filter, page) = ProductListQuery::default().into_filter(Utc::now()).unwrap();
        assert_eq!(filter, ProductFilter::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_comma_separated_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let query = ProductListQuery {
            major_categories: Some(format!("{}, {},", a, b)),
            ..Default::default()
        };
        let (filter, _) = query.into_filter(Utc::now()).unwrap();
        assert_eq!(filter.category_ids, vec![a, b]);
    }

    #[test]
    fn test_malformed_id_is_rejected() {
        let query = ProductListQuery {
            sub_categories: Some("not-a-uuid".into()),
            ..Default::default()
        };
        let err = query.into_filter(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_page_beyond_limit_is_rejected() {
        let query = ProductListQuery {
            page: Some(u64::MAX),
            ..Default::default()
        };
        let err = query.into_filter(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let query = ProductListQuery {
            page: Some(MAX_PAGE_NUMBER),
            per_page: Some(u64::MAX),
            ..Default::default()
        };
        let (_, page) = query.into_filter(Utc::now()).unwrap();
        assert_eq!(page.page_index(), MAX_PAGE_NUMBER - 1);
    }

    #[test]
    fn test_new_arrivals_window() {
        let now = Utc::now();
        let query = ProductListQuery {
            new_arrivals: Some(true),
            search_query: Some("   ".into()),
            ..Default::default()
        };
        let (filter, _) = query.into_filter(now).unwrap();
        assert_eq!(
            filter.created_after,
            Some(now - Duration::days(NEW_ARRIVAL_WINDOW_DAYS))
        );
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_stock_check() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Lamp".into(),
            description: "Desk lamp".into(),
            price: 20.0,
            stock: 2,
            is_bestseller: false,
            avg_rating: 0,
            image_url: None,
            major_category_id: Uuid::new_v4(),
            sub_category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.has_stock_for(2));
        assert!(!product.has_stock_for(3));
    }
}
