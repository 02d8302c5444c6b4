//! Profile and address book handlers for the signed-in user.

use axum::{
    extract::State,
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ValidPath, ValidatedJson};
use crate::api::middleware::{authenticated, CurrentUser};
use crate::api::AppState;
use crate::domain::{Address, AddressInput, UpdateProfile, UserResponse};
use crate::errors::AppResult;
use crate::types::{Created, MessageResponse, NoContent};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

pub fn user_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/profile", put(update_profile))
        .route("/password", put(change_password))
        .route("/addresses", get(list_addresses).post(add_address))
        .route(
            "/addresses/:address_id",
            put(update_address).delete(delete_address),
        );
    authenticated(router, state)
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "Users",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfile>,
) -> AppResult<Json<UserResponse>> {
    let updated = state.user_service.update_profile(user.id, payload).await?;
    Ok(Json(UserResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/users/password",
    tag = "Users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Current password is wrong")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .change_password(user.id, payload.current_password, payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

#[utoipa::path(
    get,
    path = "/api/users/addresses",
    tag = "Users",
    responses((status = 200, description = "Saved addresses", body = [Address])),
    security(("bearer_auth" = []))
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Address>>> {
    Ok(Json(state.user_service.list_addresses(user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/users/addresses",
    tag = "Users",
    request_body = AddressInput,
    responses((status = 201, description = "Address saved", body = Address)),
    security(("bearer_auth" = []))
)]
pub async fn add_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddressInput>,
) -> AppResult<Created<Address>> {
    Ok(Created(state.user_service.add_address(user.id, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/addresses/{address_id}",
    tag = "Users",
    params(("address_id" = Uuid, Path, description = "Address ID")),
    request_body = AddressInput,
    responses(
        (status = 200, description = "Address updated", body = Address),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(address_id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddressInput>,
) -> AppResult<Json<Address>> {
    let address = state
        .user_service
        .update_address(user.id, address_id, payload)
        .await?;
    Ok(Json(address))
}

#[utoipa::path(
    delete,
    path = "/api/users/addresses/{address_id}",
    tag = "Users",
    params(("address_id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidPath(address_id): ValidPath<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.delete_address(user.id, address_id).await?;
    Ok(NoContent)
}
