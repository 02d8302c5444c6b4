//! Application route configuration.

use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, cart_routes, category_routes, coupon_routes, order_routes,
    product_routes, rating_routes, settings_routes, subcategory_routes, user_routes,
    wishlist_routes,
};
use super::middleware::maintenance_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::{Config, NEW_AUTH_TOKEN_HEADER};

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/users", user_routes(&state))
        .nest("/products", product_routes(&state))
        .nest("/categories", category_routes(&state))
        .nest("/subcategories", subcategory_routes(&state))
        .nest("/cart", cart_routes(&state))
        .nest("/wishlist", wishlist_routes(&state))
        .nest("/orders", order_routes(&state))
        .nest("/ratings", rating_routes(&state))
        .nest("/coupons", coupon_routes(&state))
        .nest("/admin", admin_routes(&state))
        .nest("/settings", settings_routes(&state));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        // Sees the full request path, so it must wrap the nested routers
        .layer(middleware::from_fn_with_state(
            state.clone(),
            maintenance_middleware,
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the storefront frontend. The rotated-token header
/// is exposed so browsers can read it.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match HeaderValue::from_str(&config.frontend_url) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(frontend_url = %config.frontend_url, "Invalid FRONTEND_URL, CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(NEW_AUTH_TOKEN_HEADER)])
}

/// Root endpoint
async fn root() -> &'static str {
    "Storefront API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
