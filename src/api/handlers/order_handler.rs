//! Checkout and customer order handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::{ValidPath, ValidatedJson};
use crate::api::middleware::{authenticated, CurrentUser};
use crate::api::AppState;
use crate::domain::{Order, PlaceOrder};
use crate::errors::AppResult;
use crate::types::{Created, MessageResponse};

pub fn order_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/", post(place_order))
        .route("/user", get(my_orders))
        .route("/:order_id", get(get_order).delete(delete_order))
        .route("/:order_id/cancel", put(cancel_order));
    authenticated(router, state)
}

/// Turn the caller's cart into an order
///
/// Stock, coupon usage and the cart are updated atomically; any failure
/// leaves all three untouched.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = PlaceOrder,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Empty cart, insufficient stock or invalid coupon"),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn place_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<PlaceOrder>,
) -> AppResult<Created<Order>> {
    let order = state.order_service.place_order(user.id, payload).await?;
    Ok(Created(order))
}

#[utoipa::path(
    get,
    path = "/api/orders/user",
    tag = "Orders",
    responses((status = 200, description = "Caller's orders, newest first", body = [Order])),
    security(("bearer_auth" = []))
)]
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.order_service.list_for_user(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Orders",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Not your order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(order_id): ValidPath<Uuid>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service
        .get_order(user.id, user.is_admin(), order_id)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/api/orders/{order_id}/cancel",
    tag = "Orders",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled and stock restored", body = Order),
        (status = 400, description = "Order can no longer be cancelled"),
        (status = 403, description = "Not your order")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(order_id): ValidPath<Uuid>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.order_service.cancel(user.id, order_id).await?))
}

/// Only delivered or cancelled orders can be removed from history
#[utoipa::path(
    delete,
    path = "/api/orders/{order_id}",
    tag = "Orders",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 400, description = "Order still in progress"),
        (status = 403, description = "Not your order")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(order_id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.order_service.delete_for_user(user.id, order_id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
