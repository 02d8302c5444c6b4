//! API middleware.

mod auth;
mod maintenance;

pub use auth::{
    admin_middleware, auth_middleware, cleared_session_cookie, session_cookie, CurrentUser,
};
pub use maintenance::maintenance_middleware;

use axum::{middleware, routing::MethodRouter, Router};

use crate::api::AppState;

/// Require a signed-in caller on every route of `router`.
pub fn authenticated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Require an admin caller on every route of `router`.
pub fn admin_only(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Method-level variant of [`authenticated`], for paths mixing public and
/// protected methods.
pub fn signed_in(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Method-level variant of [`admin_only`].
pub fn admin(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
