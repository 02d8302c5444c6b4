//! Authentication handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{cleared_session_cookie, session_cookie, signed_in, CurrentUser};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::AuthSession;
use crate::types::MessageResponse;

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

pub fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", signed_in(get(me), state))
}

/// Register a new account and open a session
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Registration disabled"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthSession>)> {
    let session = state
        .auth_service
        .signup(payload.name, payload.email, payload.password)
        .await?;

    let cookie = session_cookie(
        session.token.clone(),
        state.auth_service.token_max_age(),
        &state.config,
    );
    Ok((StatusCode::CREATED, jar.add(cookie), Json(session)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthSession>)> {
    let session = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    let cookie = session_cookie(
        session.token.clone(),
        state.auth_service.token_max_age(),
        &state.config,
    );
    Ok((jar.add(cookie), Json(session)))
}

/// End the session by expiring the cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cookie cleared", body = MessageResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(cleared_session_cookie(&state.config)),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Current account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user; may carry a rotated token", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.me(user.id).await?;
    Ok(Json(UserResponse::from(user)))
}
