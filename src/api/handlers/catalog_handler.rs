//! Public catalog browsing plus the admin create endpoints that share
//! its paths.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{ValidPath, ValidQuery, ValidatedJson};
use crate::api::middleware::admin;
use crate::api::AppState;
use crate::domain::{
    Category, CategoryInput, Product, ProductInput, ProductListQuery, SubCategory,
    SubCategoryInput,
};
use crate::errors::AppResult;
use crate::types::{Created, Paginated};

/// Optional parent filter for subcategory listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubCategoryQuery {
    pub category_id: Option<Uuid>,
}

pub fn product_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_products).merge(admin(post(create_product), state)),
        )
        .route("/:id", get(get_product))
}

pub fn category_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_categories).merge(admin(post(create_category), state)),
        )
        .route("/:id", get(get_category))
}

pub fn subcategory_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_subcategories).merge(admin(post(create_subcategory), state)),
        )
        .route("/:id", get(get_subcategory))
}

/// Browse products with search, filters, sorting and paging
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 400, description = "Malformed filter")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ProductListQuery>,
) -> AppResult<Json<Paginated<Product>>> {
    Ok(Json(state.catalog_service.list_products(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog_service.get_product(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid category placement"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductInput>,
) -> AppResult<Created<Product>> {
    Ok(Created(state.catalog_service.create_product(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, description = "All categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog_service.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<Category>> {
    Ok(Json(state.catalog_service.get_category(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CategoryInput>,
) -> AppResult<Created<Category>> {
    Ok(Created(state.catalog_service.create_category(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/subcategories",
    tag = "Catalog",
    params(SubCategoryQuery),
    responses((status = 200, description = "Subcategories", body = [SubCategory]))
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SubCategoryQuery>,
) -> AppResult<Json<Vec<SubCategory>>> {
    Ok(Json(
        state
            .catalog_service
            .list_subcategories(query.category_id)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/subcategories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    responses(
        (status = 200, description = "Subcategory", body = SubCategory),
        (status = 404, description = "Subcategory not found")
    )
)]
pub async fn get_subcategory(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<SubCategory>> {
    Ok(Json(state.catalog_service.get_subcategory(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/subcategories",
    tag = "Catalog",
    request_body = SubCategoryInput,
    responses(
        (status = 201, description = "Subcategory created", body = SubCategory),
        (status = 404, description = "Parent category not found"),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SubCategoryInput>,
) -> AppResult<Created<SubCategory>> {
    Ok(Created(
        state.catalog_service.create_subcategory(payload).await?,
    ))
}
