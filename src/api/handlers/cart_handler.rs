//! Shopping cart handlers.
//!
//! Carts are addressed by user id in the path (or body, for `/add`); the
//! caller must be that user or an admin.

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::{ValidPath, ValidatedJson};
use crate::api::middleware::{authenticated, CurrentUser};
use crate::api::AppState;
use crate::domain::{AddToCart, CartView};
use crate::errors::AppResult;
use crate::types::MessageResponse;

pub fn cart_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/add", post(add_to_cart))
        .route("/increase/:user_id/:product_id", put(increase_quantity))
        .route("/decrease/:user_id/:product_id", put(decrease_quantity))
        .route("/:user_id", get(get_cart).delete(clear_cart))
        .route("/:user_id/:product_id", delete(remove_item));
    authenticated(router, state)
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    tag = "Cart",
    request_body = AddToCart,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Not enough stock"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddToCart>,
) -> AppResult<Json<CartView>> {
    user.ensure_self_or_admin(payload.user_id)?;
    let cart = state
        .cart_service
        .add(payload.user_id, payload.product_id, payload.quantity)
        .await?;
    Ok(Json(cart))
}

#[utoipa::path(
    get,
    path = "/api/cart/{user_id}",
    tag = "Cart",
    params(("user_id" = Uuid, Path, description = "Cart owner")),
    responses(
        (status = 200, description = "Cart with products", body = CartView),
        (status = 403, description = "Not your cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(user_id): ValidPath<Uuid>,
) -> AppResult<Json<CartView>> {
    user.ensure_self_or_admin(user_id)?;
    Ok(Json(state.cart_service.get(user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/cart/increase/{user_id}/{product_id}",
    tag = "Cart",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("product_id" = Uuid, Path, description = "Product in the cart")
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Not enough stock"),
        (status = 404, description = "Item not in cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn increase_quantity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath((user_id, product_id)): ValidPath<(Uuid, Uuid)>,
) -> AppResult<Json<CartView>> {
    user.ensure_self_or_admin(user_id)?;
    Ok(Json(state.cart_service.increase(user_id, product_id).await?))
}

/// Decrease by one; a line at quantity 1 is removed
#[utoipa::path(
    put,
    path = "/api/cart/decrease/{user_id}/{product_id}",
    tag = "Cart",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("product_id" = Uuid, Path, description = "Product in the cart")
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 404, description = "Item not in cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn decrease_quantity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath((user_id, product_id)): ValidPath<(Uuid, Uuid)>,
) -> AppResult<Json<CartView>> {
    user.ensure_self_or_admin(user_id)?;
    Ok(Json(state.cart_service.decrease(user_id, product_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}/{product_id}",
    tag = "Cart",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("product_id" = Uuid, Path, description = "Product to remove")
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 404, description = "Item not in cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath((user_id, product_id)): ValidPath<(Uuid, Uuid)>,
) -> AppResult<Json<CartView>> {
    user.ensure_self_or_admin(user_id)?;
    Ok(Json(state.cart_service.remove(user_id, product_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}",
    tag = "Cart",
    params(("user_id" = Uuid, Path, description = "Cart owner")),
    responses((status = 200, description = "Cart emptied", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(user_id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    user.ensure_self_or_admin(user_id)?;
    state.cart_service.clear(user_id).await?;
    Ok(Json(MessageResponse::new("Cart cleared")))
}
