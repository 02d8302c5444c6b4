//! Wishlist handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ValidPath, ValidatedJson};
use crate::api::middleware::{authenticated, CurrentUser};
use crate::api::AppState;
use crate::domain::Product;
use crate::errors::AppResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: Uuid,
}

pub fn wishlist_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/:product_id", delete(remove_from_wishlist));
    authenticated(router, state)
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    tag = "Wishlist",
    responses((status = 200, description = "Wishlisted products", body = [Product])),
    security(("bearer_auth" = []))
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.wishlist_service.list(user.id).await?))
}

/// Adding a product twice is a no-op
#[utoipa::path(
    post,
    path = "/api/wishlist",
    tag = "Wishlist",
    request_body = WishlistRequest,
    responses(
        (status = 200, description = "Updated wishlist", body = [Product]),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<WishlistRequest>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(
        state.wishlist_service.add(user.id, payload.product_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{product_id}",
    tag = "Wishlist",
    params(("product_id" = Uuid, Path, description = "Product to remove")),
    responses((status = 200, description = "Updated wishlist", body = [Product])),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(product_id): ValidPath<Uuid>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(
        state.wishlist_service.remove(user.id, product_id).await?,
    ))
}
