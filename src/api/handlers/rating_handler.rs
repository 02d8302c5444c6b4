//! Product rating handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::{ValidPath, ValidatedJson};
use crate::api::middleware::{signed_in, CurrentUser};
use crate::api::AppState;
use crate::domain::{ProductReview, Rating, RatingEligibility, SubmitRating};
use crate::errors::AppResult;
use crate::services::parallel;

/// Ratings shown on a product page
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRatings {
    pub product_id: Uuid,
    pub avg_rating: i32,
    pub total_ratings: usize,
    pub ratings: Vec<ProductReview>,
}

pub fn rating_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", signed_in(post(submit_rating), state))
        .route("/product/:product_id", get(product_ratings))
        .route("/user", signed_in(get(my_ratings), state))
        .route("/can-rate/:product_id", signed_in(get(can_rate), state))
}

/// Rate a product from a delivered order
///
/// Resubmitting for the same order updates the earlier rating.
#[utoipa::path(
    post,
    path = "/api/ratings",
    tag = "Ratings",
    request_body = SubmitRating,
    responses(
        (status = 200, description = "Rating saved, product average recomputed", body = Rating),
        (status = 400, description = "Order not delivered or does not contain the product"),
        (status = 403, description = "Not your order")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SubmitRating>,
) -> AppResult<Json<Rating>> {
    Ok(Json(state.rating_service.submit(user.id, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/ratings/product/{product_id}",
    tag = "Ratings",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Ratings with reviewer names", body = ProductRatings),
        (status = 404, description = "Product not found")
    )
)]
pub async fn product_ratings(
    State(state): State<AppState>,
    ValidPath(product_id): ValidPath<Uuid>,
) -> AppResult<Json<ProductRatings>> {
    let (product, ratings) = parallel::join2(
        state.catalog_service.get_product(product_id),
        state.rating_service.list_for_product(product_id),
    )
    .await?;

    Ok(Json(ProductRatings {
        product_id: product.id,
        avg_rating: product.avg_rating,
        total_ratings: ratings.len(),
        ratings,
    }))
}

#[utoipa::path(
    get,
    path = "/api/ratings/user",
    tag = "Ratings",
    responses((status = 200, description = "Caller's ratings", body = [Rating])),
    security(("bearer_auth" = []))
)]
pub async fn my_ratings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.rating_service.list_for_user(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/ratings/can-rate/{product_id}",
    tag = "Ratings",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Eligibility and any existing rating", body = RatingEligibility)),
    security(("bearer_auth" = []))
)]
pub async fn can_rate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(product_id): ValidPath<Uuid>,
) -> AppResult<Json<RatingEligibility>> {
    Ok(Json(
        state.rating_service.can_rate(user.id, product_id).await?,
    ))
}
