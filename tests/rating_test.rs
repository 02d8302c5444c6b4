//! Rating eligibility and average recomputation against the real store.

mod common;

use common::TestApp;
use storefront::domain::{Order, OrderStatus, PlaceOrder, Product, SubmitRating, UpdateOrderStatus, User};
use storefront::errors::AppError;
use storefront::services::ServiceContainer;

async fn order_product(app: &TestApp, user: &User, product: &Product) -> Order {
    let address = app.address(user).await;
    app.services.carts().add(user.id, product.id, 1).await.unwrap();
    app.services
        .orders()
        .place_order(
            user.id,
            PlaceOrder {
                address_id: address.id,
                is_gift: false,
                gift_message: None,
                payment_method: "cod".to_string(),
                coupon_code: None,
            },
        )
        .await
        .unwrap()
}

async fn deliver(app: &TestApp, order: &Order) {
    app.services
        .orders()
        .update_status(
            order.id,
            UpdateOrderStatus {
                status: OrderStatus::Delivered,
                tracking_number: Some("TRACK-1".to_string()),
            },
        )
        .await
        .unwrap();
}

fn rating(order: &Order, product: &Product, score: i32) -> SubmitRating {
    SubmitRating {
        product_id: product.id,
        order_id: order.id,
        rating: score,
        review: Some("  Solid  ".to_string()),
    }
}

#[tokio::test]
async fn test_only_delivered_orders_can_be_rated() {
    let app = TestApp::new().await;
    let user = app.customer("rater@example.com").await;
    let category = app.category("Books").await;
    let book = app.product(&category, "Novel", 20.0, 10).await;
    let order = order_product(&app, &user, &book).await;

    let eligibility = app.services.ratings().can_rate(user.id, book.id).await.unwrap();
    assert!(!eligibility.can_rate);
    assert_eq!(eligibility.order_id, None);

    let err = app
        .services
        .ratings()
        .submit(user.id, rating(&order, &book, 4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    deliver(&app, &order).await;
    let delivered = app.services.orders().get_order(user.id, false, order.id).await.unwrap();
    assert_eq!(delivered.tracking_number.as_deref(), Some("TRACK-1"));

    let eligibility = app.services.ratings().can_rate(user.id, book.id).await.unwrap();
    assert!(eligibility.can_rate);
    assert_eq!(eligibility.order_id, Some(order.id));
    assert!(eligibility.existing_rating.is_none());
}

#[tokio::test]
async fn test_resubmission_updates_and_average_is_rounded() {
    let app = TestApp::new().await;
    let first = app.customer("first@example.com").await;
    let second = app.customer("second@example.com").await;
    let category = app.category("Books").await;
    let book = app.product(&category, "Novel", 20.0, 10).await;

    let first_order = order_product(&app, &first, &book).await;
    deliver(&app, &first_order).await;

    let saved = app
        .services
        .ratings()
        .submit(first.id, rating(&first_order, &book, 4))
        .await
        .unwrap();
    assert_eq!(saved.review.as_deref(), Some("Solid"));
    assert_eq!(app.services.catalog().get_product(book.id).await.unwrap().avg_rating, 4);

    let updated = app
        .services
        .ratings()
        .submit(first.id, rating(&first_order, &book, 2))
        .await
        .unwrap();
    assert_eq!(updated.id, saved.id);
    assert_eq!(app.services.ratings().list_for_user(first.id).await.unwrap().len(), 1);
    assert_eq!(app.services.catalog().get_product(book.id).await.unwrap().avg_rating, 2);

    let second_order = order_product(&app, &second, &book).await;
    deliver(&app, &second_order).await;
    app.services
        .ratings()
        .submit(second.id, rating(&second_order, &book, 5))
        .await
        .unwrap();

    // round((2 + 5) / 2)
    assert_eq!(app.services.catalog().get_product(book.id).await.unwrap().avg_rating, 4);
    let reviews = app.services.ratings().list_for_product(book.id).await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert!(reviews.iter().all(|review| review.user_name == "Shopper"));

    let eligibility = app.services.ratings().can_rate(first.id, book.id).await.unwrap();
    assert!(eligibility.can_rate);
    assert_eq!(eligibility.order_id, Some(first_order.id));
    assert_eq!(eligibility.existing_rating.map(|r| r.rating), Some(2));
}

#[tokio::test]
async fn test_rating_requires_ownership_and_matching_product() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@example.com").await;
    let other = app.customer("other@example.com").await;
    let category = app.category("Books").await;
    let book = app.product(&category, "Novel", 20.0, 10).await;
    let pen = app.product(&category, "Pen", 2.0, 10).await;

    let order = order_product(&app, &owner, &book).await;
    deliver(&app, &order).await;

    let err = app
        .services
        .ratings()
        .submit(other.id, rating(&order, &book, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .services
        .ratings()
        .submit(owner.id, rating(&order, &pen, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.services.catalog().get_product(pen.id).await.unwrap().avg_rating, 0);
}
