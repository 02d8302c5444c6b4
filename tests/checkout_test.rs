//! End-to-end checkout flows against the real repositories.

mod common;

use common::TestApp;
use storefront::domain::{
    DiscountType, OrderStatus, PaymentStatus, PlaceOrder, ProductUpdate, UpdateOrderStatus,
};
use storefront::errors::AppError;
use storefront::services::ServiceContainer;
use uuid::Uuid;

fn checkout(address_id: Uuid, coupon_code: Option<&str>) -> PlaceOrder {
    PlaceOrder {
        address_id,
        is_gift: false,
        gift_message: None,
        payment_method: "cod".to_string(),
        coupon_code: coupon_code.map(str::to_string),
    }
}

fn validation_message(err: AppError) -> String {
    match err {
        AppError::Validation(message) => message,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_checkout_without_coupon() {
    let app = TestApp::new().await;
    let user = app.customer("a@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let product = app.product(&category, "Mug", 100.0, 5).await;

    app.services.carts().add(user.id, product.id, 2).await.unwrap();
    let order = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, None))
        .await
        .unwrap();

    assert_eq!(order.subtotal, 200.0);
    assert_eq!(order.discount, 0.0);
    assert_eq!(order.total_amount, 200.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].price, 100.0);
    assert_eq!(order.shipping_address.city, "Pune");

    assert_eq!(app.stock_of(product.id).await, 3);
    let cart = app.services.carts().get(user.id).await.unwrap();
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn test_checkout_with_percentage_coupon() {
    let app = TestApp::new().await;
    let user = app.customer("b@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let product = app.product(&category, "Mug", 100.0, 5).await;
    let coupon = app
        .coupon("SAVE10", DiscountType::Percentage, Some(10.0), 50.0, 100)
        .await;

    app.services.carts().add(user.id, product.id, 2).await.unwrap();
    let order = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, Some("save10")))
        .await
        .unwrap();

    assert_eq!(order.discount, 20.0);
    assert_eq!(order.total_amount, 180.0);
    assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));

    let coupon = app.services.coupons().get(coupon.id).await.unwrap();
    assert_eq!(coupon.used_count, 1);
}

#[tokio::test]
async fn test_checkout_with_dynamic_coupon() {
    let app = TestApp::new().await;
    let user = app.customer("c@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Audio").await;
    let product = app.product(&category, "Speaker", 500.0, 2).await;
    app.coupon("FLAT150", DiscountType::Dynamic, None, 0.0, 10).await;

    let quote = app.services.coupons().validate("FLAT150", 500.0).await.unwrap();
    assert!(quote.valid);
    assert_eq!(quote.discount, 150.0);
    assert_eq!(quote.final_amount, 350.0);

    app.services.carts().add(user.id, product.id, 1).await.unwrap();
    let order = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, Some("FLAT150")))
        .await
        .unwrap();

    assert_eq!(order.discount, 150.0);
    assert_eq!(order.total_amount, 350.0);
}

#[tokio::test]
async fn test_admin_cancellation_restores_stock() {
    let app = TestApp::new().await;
    let user = app.customer("d@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let mug = app.product(&category, "Mug", 100.0, 5).await;
    let plate = app.product(&category, "Plate", 40.0, 8).await;

    app.services.carts().add(user.id, mug.id, 2).await.unwrap();
    app.services.carts().add(user.id, plate.id, 3).await.unwrap();
    let order = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, None))
        .await
        .unwrap();
    assert_eq!(app.stock_of(mug.id).await, 3);
    assert_eq!(app.stock_of(plate.id).await, 5);

    let cancelled = app
        .services
        .orders()
        .update_status(
            order.id,
            UpdateOrderStatus {
                status: OrderStatus::Cancelled,
                tracking_number: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
    assert_eq!(app.stock_of(mug.id).await, 5);
    assert_eq!(app.stock_of(plate.id).await, 8);

    // Cancelled orders are final
    let err = app
        .services
        .orders()
        .update_status(
            order.id,
            UpdateOrderStatus {
                status: OrderStatus::Processing,
                tracking_number: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.stock_of(mug.id).await, 5);
}

#[tokio::test]
async fn test_customer_cancellation_rules() {
    let app = TestApp::new().await;
    let user = app.customer("cancel@example.com").await;
    let stranger = app.customer("stranger@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let mug = app.product(&category, "Mug", 100.0, 5).await;

    app.services.carts().add(user.id, mug.id, 1).await.unwrap();
    let order = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, None))
        .await
        .unwrap();

    let err = app.services.orders().cancel(stranger.id, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .services
        .orders()
        .delete_for_user(user.id, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let cancelled = app.services.orders().cancel(user.id, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(app.stock_of(mug.id).await, 5);

    app.services
        .orders()
        .delete_for_user(user.id, order.id)
        .await
        .unwrap();
    assert!(app.services.orders().list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_rejects_quantities_beyond_stock() {
    let app = TestApp::new().await;
    let user = app.customer("e@example.com").await;
    let category = app.category("Kitchen").await;
    let product = app.product(&category, "Mug", 100.0, 5).await;

    app.services.carts().add(user.id, product.id, 3).await.unwrap();
    let err = app
        .services
        .carts()
        .add(user.id, product.id, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let cart = app.services.carts().get(user.id).await.unwrap();
    assert_eq!(cart.items[0].quantity, 3);

    app.services.carts().add(user.id, product.id, 2).await.unwrap();
    let err = app
        .services
        .carts()
        .increase(user.id, product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let cart = app.services.carts().get(user.id).await.unwrap();
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.total_items, 5);
}

#[tokio::test]
async fn test_failed_checkout_rolls_back_every_write() {
    let app = TestApp::new().await;
    let user = app.customer("rollback@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let mug = app.product(&category, "Mug", 100.0, 5).await;
    let teapot = app.product(&category, "Teapot", 60.0, 4).await;
    let coupon = app
        .coupon("SAVE10", DiscountType::Percentage, Some(10.0), 0.0, 100)
        .await;

    app.services.carts().add(user.id, mug.id, 2).await.unwrap();
    app.services.carts().add(user.id, teapot.id, 3).await.unwrap();

    // Stock drops after the teapot went into the cart
    app.services
        .catalog()
        .update_product(
            teapot.id,
            ProductUpdate {
                stock: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, Some("SAVE10")))
        .await
        .unwrap_err();
    assert_eq!(
        validation_message(err),
        "Insufficient stock for Teapot. Only 1 left"
    );

    assert_eq!(app.stock_of(mug.id).await, 5);
    assert_eq!(app.stock_of(teapot.id).await, 1);
    let coupon = app.services.coupons().get(coupon.id).await.unwrap();
    assert_eq!(coupon.used_count, 0);
    let cart = app.services.carts().get(user.id).await.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert!(app.services.orders().list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_coupon_blocks_checkout() {
    let app = TestApp::new().await;
    let user = app.customer("limit@example.com").await;
    let address = app.address(&user).await;
    let category = app.category("Kitchen").await;
    let mug = app.product(&category, "Mug", 100.0, 5).await;
    let coupon = app
        .coupon("ONCE", DiscountType::Fixed, Some(25.0), 0.0, 1)
        .await;

    let applied = app.services.coupons().apply("once", 100.0).await.unwrap();
    assert_eq!(applied.discount, 25.0);

    app.services.carts().add(user.id, mug.id, 1).await.unwrap();
    let err = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, Some("ONCE")))
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Coupon usage limit reached");

    assert_eq!(app.stock_of(mug.id).await, 5);
    let coupon = app.services.coupons().get(coupon.id).await.unwrap();
    assert_eq!(coupon.used_count, 1);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart_and_unknown_coupon() {
    let app = TestApp::new().await;
    let user = app.customer("empty@example.com").await;
    let address = app.address(&user).await;

    let err = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, None))
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Cart is empty");

    let category = app.category("Kitchen").await;
    let mug = app.product(&category, "Mug", 100.0, 5).await;
    app.services.carts().add(user.id, mug.id, 1).await.unwrap();
    let err = app
        .services
        .orders()
        .place_order(user.id, checkout(address.id, Some("NOPE")))
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Invalid coupon code");
    assert_eq!(app.stock_of(mug.id).await, 5);
}
