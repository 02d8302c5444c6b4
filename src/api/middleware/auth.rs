//! JWT authentication middleware.
//!
//! The session token is read from the `token` cookie, falling back to an
//! `Authorization: Bearer` header. Tokens close to expiry are rotated: the
//! response carries the new token both as a cookie and in `New-Auth-Token`.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{Config, AUTH_COOKIE_NAME, BEARER_TOKEN_PREFIX, NEW_AUTH_TOKEN_HEADER};
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

/// Authenticated caller, attached to the request by [`auth_middleware`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Allow access to `owner_id`'s resources to the owner and to admins.
    pub fn ensure_self_or_admin(&self, owner_id: Uuid) -> AppResult<()> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("You can only access your own resources"))
        }
    }
}

/// Session token from the cookie, else from the bearer header.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// HTTP-only session cookie. Production adds `Secure` and `SameSite=Strict`.
pub fn session_cookie(token: String, max_age_secs: i64, config: &Config) -> Cookie<'static> {
    let same_site = if config.is_production() {
        SameSite::Strict
    } else {
        SameSite::Lax
    };

    Cookie::build((AUTH_COOKIE_NAME, token))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .secure(config.is_production())
        .same_site(same_site)
        .build()
}

/// Expired copy of the session cookie, used on logout.
pub fn cleared_session_cookie(config: &Config) -> Cookie<'static> {
    session_cookie(String::new(), 0, config)
}

/// JWT authentication middleware.
///
/// Rejects the request with 401 when no valid token is present, otherwise
/// injects [`CurrentUser`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = state
        .auth_service
        .verify_token(&token)
        .map_err(|_| AppError::InvalidToken)?;

    let current_user = CurrentUser {
        id: claims.sub,
        role: UserRole::from(claims.role.as_str()),
    };
    let rotated = state.auth_service.refresh_if_expiring(&claims)?;

    request.extensions_mut().insert(current_user);
    let mut response = next.run(request).await;

    if let Some(token) = rotated {
        let max_age = state.auth_service.token_max_age();
        let cookie = session_cookie(token.clone(), max_age, &state.config);
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            headers.append(SET_COOKIE, value);
        }
        if let Ok(value) = HeaderValue::from_str(&token) {
            headers.insert(HeaderName::from_static(NEW_AUTH_TOKEN_HEADER), value);
        }
        tracing::debug!(user_id = %current_user.id, "Session token rotated");
    }

    Ok(response)
}

/// Admin gate. Must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or(AppError::Unauthorized)?;

    if !user.is_admin() {
        return Err(AppError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("theme=dark; token=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn test_cookie_attributes_follow_environment() {
        let mut config = Config::for_testing("test-secret-key-for-testing-only-32chars");
        let dev = session_cookie("t".into(), 60, &config).to_string();
        assert!(dev.contains("HttpOnly"));
        assert!(dev.contains("SameSite=Lax"));
        assert!(!dev.contains("Secure"));

        config.environment = "production".into();
        let prod = session_cookie("t".into(), 60, &config).to_string();
        assert!(prod.contains("SameSite=Strict"));
        assert!(prod.contains("Secure"));
        assert!(prod.contains("Max-Age=60"));
    }

    #[test]
    fn test_ownership_check() {
        let owner = Uuid::new_v4();
        let user = CurrentUser {
            id: owner,
            role: UserRole::User,
        };
        assert!(user.ensure_self_or_admin(owner).is_ok());
        assert!(user.ensure_self_or_admin(Uuid::new_v4()).is_err());

        let admin = CurrentUser {
            id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(admin.ensure_self_or_admin(owner).is_ok());
    }
}
