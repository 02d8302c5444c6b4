//! Catalog, dashboard and account flows against the real repositories.

mod common;

use common::TestApp;
use storefront::domain::{
    AddressInput, Category, OrderStatus, PlaceOrder, Product, ProductInput, ProductListQuery,
    ProductSort, StatusCount, SubCategory, SubCategoryInput,
};
use storefront::errors::AppError;
use storefront::services::ServiceContainer;
use uuid::Uuid;

async fn placed_product(
    app: &TestApp,
    category: &Category,
    subcategory: Option<&SubCategory>,
    name: &str,
    price: f64,
    is_bestseller: bool,
) -> Product {
    app.services
        .catalog()
        .create_product(ProductInput {
            name: name.to_string(),
            description: format!("{} description", name),
            price,
            stock: 10,
            is_bestseller,
            image_url: None,
            major_category_id: category.id,
            sub_category_id: subcategory.map(|s| s.id),
        })
        .await
        .unwrap()
}

async fn subcategory(app: &TestApp, category: &Category, name: &str) -> SubCategory {
    app.services
        .catalog()
        .create_subcategory(SubCategoryInput {
            name: name.to_string(),
            description: None,
            category_id: category.id,
        })
        .await
        .unwrap()
}

async fn names(app: &TestApp, query: ProductListQuery) -> Vec<String> {
    app.services
        .catalog()
        .list_products(query)
        .await
        .unwrap()
        .data
        .into_iter()
        .map(|p| p.name)
        .collect()
}

fn validation_message(err: AppError) -> String {
    match err {
        AppError::Validation(message) => message,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_product_listing_filters_and_sorting() {
    let app = TestApp::new().await;
    let audio = app.category("Audio").await;
    let books = app.category("Books").await;
    let headphones = subcategory(&app, &audio, "Headphones").await;
    placed_product(&app, &audio, None, "Speaker", 80.0, true).await;
    placed_product(&app, &audio, Some(&headphones), "Earbuds", 40.0, false).await;
    placed_product(&app, &books, None, "Novel", 15.0, false).await;

    let ascending = names(
        &app,
        ProductListQuery {
            sort_order: Some(ProductSort::Asc),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(ascending, ["Novel", "Earbuds", "Speaker"]);

    let descending = names(
        &app,
        ProductListQuery {
            sort_order: Some(ProductSort::Desc),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(descending, ["Speaker", "Earbuds", "Novel"]);

    let bestsellers = names(
        &app,
        ProductListQuery {
            bestsellers: Some(true),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(bestsellers, ["Speaker"]);

    let in_audio = names(
        &app,
        ProductListQuery {
            major_categories: Some(audio.id.to_string()),
            sort_order: Some(ProductSort::Asc),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(in_audio, ["Earbuds", "Speaker"]);

    let in_both = names(
        &app,
        ProductListQuery {
            major_categories: Some(format!("{},{}", audio.id, books.id)),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(in_both.len(), 3);

    let in_headphones = names(
        &app,
        ProductListQuery {
            sub_categories: Some(headphones.id.to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(in_headphones, ["Earbuds"]);

    let fresh = names(
        &app,
        ProductListQuery {
            new_arrivals: Some(true),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(fresh.len(), 3);

    let second_page = app
        .services
        .catalog()
        .list_products(ProductListQuery {
            sort_order: Some(ProductSort::Asc),
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second_page.meta.total, 3);
    assert_eq!(second_page.meta.total_pages, 2);
    assert_eq!(second_page.data.len(), 1);
    assert_eq!(second_page.data[0].name, "Speaker");
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected() {
    let app = TestApp::new().await;
    let category = app.category("Garden").await;
    app.product(&category, "Rake", 15.0, 4).await;

    let err = app
        .services
        .catalog()
        .list_products(ProductListQuery {
            page: Some(u64::MAX),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_referenced_categories_cannot_be_deleted() {
    let app = TestApp::new().await;
    let catalog = app.services.catalog();
    let audio = app.category("Audio").await;
    let headphones = subcategory(&app, &audio, "Headphones").await;
    let earbuds = placed_product(&app, &audio, Some(&headphones), "Earbuds", 40.0, false).await;

    let err = catalog.delete_category(audio.id).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Category still has products and cannot be deleted"
    );
    let err = catalog.delete_subcategory(headphones.id).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Subcategory still has products and cannot be deleted"
    );

    catalog.delete_product(earbuds.id).await.unwrap();
    let err = catalog.delete_category(audio.id).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Category still has subcategories and cannot be deleted"
    );

    catalog.delete_subcategory(headphones.id).await.unwrap();
    catalog.delete_category(audio.id).await.unwrap();
    assert!(matches!(
        catalog.get_category(audio.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_dashboard_revenue_and_low_stock() {
    let app = TestApp::new().await;
    app.admin().await;
    let user = app.customer("dash@example.com").await;
    let address = app.address(&user).await;
    let kitchen = app.category("Kitchen").await;
    let kettle = app.product(&kitchen, "Kettle", 100.0, 50).await;
    let teapot = app.product(&kitchen, "Teapot", 50.0, 20).await;
    for (name, stock) in [
        ("Spoon", 0),
        ("Fork", 2),
        ("Knife", 5),
        ("Plate", 7),
        ("Lid", 8),
        ("Bowl", 9),
        ("Cup", 10),
    ] {
        app.product(&kitchen, name, 5.0, stock).await;
    }

    let place = |address_id: Uuid| PlaceOrder {
        address_id,
        is_gift: false,
        gift_message: None,
        payment_method: "cod".to_string(),
        coupon_code: None,
    };
    app.services.carts().add(user.id, kettle.id, 2).await.unwrap();
    app.services
        .orders()
        .place_order(user.id, place(address.id))
        .await
        .unwrap();
    app.services.carts().add(user.id, teapot.id, 1).await.unwrap();
    let cancelled = app
        .services
        .orders()
        .place_order(user.id, place(address.id))
        .await
        .unwrap();
    app.services
        .orders()
        .cancel(user.id, cancelled.id)
        .await
        .unwrap();

    let stats = app.services.dashboard().stats().await.unwrap();

    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_products, 9);
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.total_categories, 1);
    assert_eq!(stats.total_revenue, 200.0);
    assert_eq!(stats.recent_orders.len(), 2);

    let low: Vec<(&str, i32)> = stats
        .low_stock_products
        .iter()
        .map(|p| (p.name.as_str(), p.stock))
        .collect();
    assert_eq!(
        low,
        [("Spoon", 0), ("Fork", 2), ("Knife", 5), ("Plate", 7), ("Lid", 8)]
    );

    assert!(stats.orders_by_status.contains(&StatusCount {
        status: OrderStatus::Pending,
        count: 1
    }));
    assert!(stats.orders_by_status.contains(&StatusCount {
        status: OrderStatus::Cancelled,
        count: 1
    }));
    assert!(stats.orders_by_status.contains(&StatusCount {
        status: OrderStatus::Delivered,
        count: 0
    }));
}

#[tokio::test]
async fn test_addresses_are_scoped_to_their_owner() {
    let app = TestApp::new().await;
    let users = app.services.users();
    let owner = app.customer("owner@example.com").await;
    let other = app.customer("other@example.com").await;
    let address = app.address(&owner).await;

    let moved = AddressInput {
        street: "9 Hill Road".to_string(),
        city: "Mumbai".to_string(),
        state: "MH".to_string(),
        country: "India".to_string(),
        zip: "400001".to_string(),
    };

    assert!(matches!(
        users.update_address(other.id, address.id, moved.clone()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        users.delete_address(other.id, address.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(users.list_addresses(other.id).await.unwrap().is_empty());

    let updated = users
        .update_address(owner.id, address.id, moved)
        .await
        .unwrap();
    assert_eq!(updated.city, "Mumbai");
    assert_eq!(users.list_addresses(owner.id).await.unwrap().len(), 1);

    users.delete_address(owner.id, address.id).await.unwrap();
    assert!(users.list_addresses(owner.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wishlist_add_list_remove() {
    let app = TestApp::new().await;
    let wishlists = app.services.wishlists();
    let user = app.customer("wish@example.com").await;
    let category = app.category("Garden").await;
    let rake = app.product(&category, "Rake", 15.0, 4).await;
    let hose = app.product(&category, "Hose", 25.0, 4).await;

    wishlists.add(user.id, rake.id).await.unwrap();
    wishlists.add(user.id, rake.id).await.unwrap();
    let listed = wishlists.add(user.id, hose.id).await.unwrap();
    assert_eq!(listed.len(), 2);

    let listed = wishlists.remove(user.id, rake.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, hose.id);

    let listed = wishlists.remove(user.id, rake.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(wishlists
        .list(Uuid::new_v4())
        .await
        .unwrap()
        .is_empty());
}
