//! Admin panel handlers. Every route here requires the admin role.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ValidPath, ValidQuery, ValidatedJson};
use crate::api::middleware::{admin_only, CurrentUser};
use crate::api::AppState;
use crate::domain::{
    Category, CategoryInput, DashboardStats, Order, OrderStatus, Product, ProductInput,
    ProductUpdate, SubCategory, SubCategoryInput, UpdateOrderStatus, UserResponse, UserRole,
};
use crate::errors::AppResult;
use crate::types::{Created, MessageResponse};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

pub fn admin_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/users/:id", put(update_user_role).delete(delete_user))
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
        .route("/subcategories", post(create_subcategory))
        .route(
            "/subcategories/:id",
            put(update_subcategory).delete(delete_subcategory),
        )
        .route("/orders", get(list_orders))
        .route(
            "/orders/:id",
            get(get_order).put(update_order_status).delete(delete_order),
        );
    admin_only(router, state)
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses((status = 200, description = "Store statistics", body = DashboardStats)),
    security(("bearer_auth" = []))
)]
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(state.dashboard_service.stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses((status = 200, description = "All accounts", body = [UserResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Change an account's role; admins cannot demote themselves
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 403, description = "Cannot change own role"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .update_role(actor.id, id, payload.role)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Cannot delete own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.user_service.delete_user(actor.id, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Admin",
    request_body = ProductInput,
    responses((status = 201, description = "Product created", body = Product)),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductInput>,
) -> AppResult<Created<Product>> {
    Ok(Created(state.catalog_service.create_product(payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProductUpdate>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog_service.update_product(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.catalog_service.delete_product(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "Admin",
    request_body = CategoryInput,
    responses((status = 201, description = "Category created", body = Category)),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CategoryInput>,
) -> AppResult<Created<Category>> {
    Ok(Created(state.catalog_service.create_category(payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CategoryInput>,
) -> AppResult<Json<Category>> {
    Ok(Json(state.catalog_service.update_category(id, payload).await?))
}

/// Categories still referenced by products or subcategories are kept
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 400, description = "Category still in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.catalog_service.delete_category(id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/admin/subcategories",
    tag = "Admin",
    request_body = SubCategoryInput,
    responses((status = 201, description = "Subcategory created", body = SubCategory)),
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

#[utoipa::path(
    put,
    path = "/api/admin/subcategories/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    request_body = SubCategoryInput,
    responses(
        (status = 200, description = "Subcategory updated", body = SubCategory),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_subcategory(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<SubCategoryInput>,
) -> AppResult<Json<SubCategory>> {
    Ok(Json(
        state.catalog_service.update_subcategory(id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/subcategories/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    responses(
        (status = 200, description = "Subcategory deleted", body = MessageResponse),
        (status = 400, description = "Subcategory still in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_subcategory(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.catalog_service.delete_subcategory(id).await?;
    Ok(Json(MessageResponse::new("Subcategory deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin",
    params(OrderListQuery),
    responses((status = 200, description = "Orders, newest first", body = [Order])),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.order_service.list_all(query.status).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.order_service.get_order(actor.id, true, id).await?))
}

/// Move an order through its lifecycle
///
/// Cancelling restocks items and delivering completes the payment.
/// Cancelled orders are final.
#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatus>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.order_service.update_status(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.order_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
