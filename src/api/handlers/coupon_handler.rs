//! Coupon administration and redemption handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::{ValidPath, ValidatedJson};
use crate::api::middleware::{admin_only, authenticated};
use crate::api::AppState;
use crate::domain::{Coupon, CouponCheck, CouponInput, CouponQuote, CouponUpdate};
use crate::errors::AppResult;
use crate::types::{Created, MessageResponse};

pub fn coupon_routes(state: &AppState) -> Router<AppState> {
    let redemption = Router::new()
        .route("/validate", post(validate_coupon))
        .route("/apply", post(apply_coupon));

    let management = Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route(
            "/:id",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        );

    authenticated(redemption, state).merge(admin_only(management, state))
}

/// Quote a coupon against an order amount without redeeming it
#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    tag = "Coupons",
    request_body = CouponCheck,
    responses(
        (status = 200, description = "Quote; `valid` is false with a reason when the coupon cannot be used", body = CouponQuote),
        (status = 400, description = "Unknown coupon code")
    ),
    security(("bearer_auth" = []))
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CouponCheck>,
) -> AppResult<Json<CouponQuote>> {
    let quote = state
        .coupon_service
        .validate(&payload.code, payload.order_amount)
        .await?;
    Ok(Json(quote))
}

/// Validate and count one use of the coupon
#[utoipa::path(
    post,
    path = "/api/coupons/apply",
    tag = "Coupons",
    request_body = CouponCheck,
    responses(
        (status = 200, description = "Coupon applied", body = CouponQuote),
        (status = 400, description = "Coupon invalid or exhausted")
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CouponCheck>,
) -> AppResult<Json<CouponQuote>> {
    let quote = state
        .coupon_service
        .apply(&payload.code, payload.order_amount)
        .await?;
    Ok(Json(quote))
}

#[utoipa::path(
    get,
    path = "/api/coupons",
    tag = "Coupons",
    responses((status = 200, description = "All coupons", body = [Coupon])),
    security(("bearer_auth" = []))
)]
pub async fn list_coupons(State(state): State<AppState>) -> AppResult<Json<Vec<Coupon>>> {
    Ok(Json(state.coupon_service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/coupons",
    tag = "Coupons",
    request_body = CouponInput,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CouponInput>,
) -> AppResult<Created<Coupon>> {
    Ok(Created(state.coupon_service.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon", body = Coupon),
        (status = 404, description = "Coupon not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_coupon(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<Coupon>> {
    Ok(Json(state.coupon_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    request_body = CouponUpdate,
    responses(
        (status = 200, description = "Coupon updated", body = Coupon),
        (status = 404, description = "Coupon not found"),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_coupon(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CouponUpdate>,
) -> AppResult<Json<Coupon>> {
    Ok(Json(state.coupon_service.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon deleted", body = MessageResponse),
        (status = 404, description = "Coupon not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.coupon_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Coupon deleted successfully")))
}
