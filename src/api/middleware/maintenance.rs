//! Maintenance mode gate.
//!
//! Runs ahead of routing. While maintenance mode is on, only allow-listed
//! routes and admin callers get through; everyone else receives 503 with the
//! configured message.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use super::auth::token_from_headers;
use crate::api::AppState;
use crate::errors::AppError;

/// Routes reachable during maintenance, so admins can sign in and switch it off.
fn is_allow_listed(method: &Method, path: &str) -> bool {
    if path == "/health" || path == "/api/admin" || path.starts_with("/api/admin/") {
        return true;
    }

    matches!(
        (method, path),
        (&Method::GET, "/api/settings")
            | (&Method::POST, "/api/auth/login")
            | (&Method::GET, "/api/auth/me")
    )
}

pub async fn maintenance_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_allow_listed(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    if !state.settings_service.is_maintenance_mode().await? {
        return Ok(next.run(request).await);
    }

    // Any decoding failure simply means "not an admin"
    let is_admin = token_from_headers(request.headers())
        .and_then(|token| state.auth_service.verify_token(&token).ok())
        .is_some_and(|claims| claims.is_admin());
    if is_admin {
        return Ok(next.run(request).await);
    }

    tracing::debug!(path = %request.uri().path(), "Request blocked by maintenance mode");
    let settings = state.settings_service.get().await?;
    Err(AppError::Maintenance(settings.maintenance_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(is_allow_listed(&Method::GET, "/health"));
        assert!(is_allow_listed(&Method::DELETE, "/api/admin/products/1"));
        assert!(is_allow_listed(&Method::GET, "/api/settings"));
        assert!(is_allow_listed(&Method::POST, "/api/auth/login"));
        assert!(is_allow_listed(&Method::GET, "/api/auth/me"));

        assert!(!is_allow_listed(&Method::PUT, "/api/settings"));
        assert!(!is_allow_listed(&Method::POST, "/api/auth/signup"));
        assert!(!is_allow_listed(&Method::GET, "/api/products"));
        assert!(!is_allow_listed(&Method::GET, "/api/administrators"));
    }
}
