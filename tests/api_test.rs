//! Router-level tests: the full middleware stack over an in-memory database.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{TestApp, PASSWORD, TEST_SECRET};
use storefront::config::Config;
use storefront::domain::SettingsUpdate;
use storefront::services::ServiceContainer;

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_and_public_catalog() {
    let app = TestApp::new().await;
    let category = app.category("Garden").await;
    app.product(&category, "Rake", 15.0, 4).await;

    let response = app
        .router()
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/products?searchQuery=rak", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Rake");
}

#[tokio::test]
async fn test_missing_token_returns_unified_401() {
    let app = TestApp::new().await;
    let user = app.customer("anon@example.com").await;

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            &format!("/api/cart/{}", user.id),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({ "error": { "code": "UNAUTHORIZED", "message": "Authentication required" } })
    );
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new().await;
    app.customer("login@example.com").await;

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "LOGIN@example.com", "password": PASSWORD })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], "login@example.com");
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    // The cookie alone authenticates
    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, format!("token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    app.customer("wrong@example.com").await;

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "wrong@example.com", "password": "not-the-password" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_expiring_token_is_rotated() {
    let mut config = Config::for_testing(TEST_SECRET);
    // Longer than the token lifetime, so every token counts as expiring
    config.jwt_refresh_threshold_hours = config.jwt_expiration_days * 24 + 1;
    let app = TestApp::with_config(config).await;
    let user = app.customer("rotate@example.com").await;
    let token = app.token_for(&user);

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/auth/me", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("new-auth-token"));
    assert!(response.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_fresh_token_is_not_rotated() {
    let app = TestApp::new().await;
    let user = app.customer("fresh@example.com").await;
    let token = app.token_for(&user);

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/auth/me", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("new-auth-token"));
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let app = TestApp::new().await;
    let user = app.customer("nosy@example.com").await;
    let admin = app.admin().await;

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/api/admin/dashboard",
            Some(&app.token_for(&user)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/api/admin/dashboard",
            Some(&app.token_for(&admin)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["totalUsers"], 2);
    assert_eq!(body["ordersByStatus"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_public_catalog_post_requires_admin() {
    let app = TestApp::new().await;
    let user = app.customer("poster@example.com").await;
    let admin = app.admin().await;
    let payload = json!({ "name": "Tools" });

    let response = app
        .router()
        .oneshot(request(Method::POST, "/api/categories", None, Some(payload.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/categories",
            Some(&app.token_for(&user)),
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/categories",
            Some(&app.token_for(&admin)),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_cart_is_private_to_its_owner() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@example.com").await;
    let other = app.customer("other@example.com").await;

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            &format!("/api/cart/{}", owner.id),
            Some(&app.token_for(&other)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            &format!("/api/cart/{}", owner.id),
            Some(&app.token_for(&owner)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["totalItems"], 0);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/products/not-a-uuid", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_maintenance_mode_blocks_shoppers_only() {
    let app = TestApp::new().await;
    let user = app.customer("shopper@example.com").await;
    let admin = app.admin().await;
    app.services
        .settings()
        .update(SettingsUpdate {
            maintenance_mode: Some(true),
            maintenance_message: Some("Back soon".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/products", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        json_body(response).await,
        json!({ "error": { "code": "MAINTENANCE", "message": "Back soon" } })
    );

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/api/products",
            Some(&app.token_for(&user)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    for uri in ["/api/settings", "/health"] {
        let response = app
            .router()
            .oneshot(request(Method::GET, uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/api/products",
            Some(&app.token_for(&admin)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_over_http() {
    let app = TestApp::new().await;
    let user = app.customer("http@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let mug = app.product(&category, "Mug", 100.0, 5).await;
    let token = app.token_for(&user);

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({ "userId": user.id, "productId": mug.id, "quantity": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({ "addressId": address.id, "paymentMethod": "cod" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = json_body(response).await;
    assert_eq!(order["totalAmount"], 200.0);
    assert_eq!(order["status"], "pending");

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/orders/user", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_page_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/api/products?page=18446744073709551615",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_currency_update_derives_symbol() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let user = app.customer("shopper@example.com").await;

    let response = app
        .router()
        .oneshot(request(
            Method::PUT,
            "/api/settings",
            Some(&app.token_for(&user)),
            Some(json!({ "defaultCurrency": "EUR" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(request(
            Method::PUT,
            "/api/settings",
            Some(&app.token_for(&admin)),
            Some(json!({ "defaultCurrency": "EUR" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["defaultCurrency"], "EUR");
    assert_eq!(body["currencySymbol"], "€");

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/settings", None, None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["currencySymbol"], "€");
}
