//! Order repository.
//!
//! An order is stored as a header row plus snapshot lines; every read
//! hydrates both into the domain `Order`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use crate::domain::{NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, ShippingAddress};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: NewOrder) -> AppResult<Order>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// A user's orders, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

    /// All orders, newest first, optionally filtered by status
    async fn list(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>>;

    async fn recent(&self, limit: u64) -> AppResult<Vec<Order>>;

    /// Delivered orders of `user_id` that contain `product_id`, newest first
    async fn delivered_with_product(&self, user_id: Uuid, product_id: Uuid)
        -> AppResult<Vec<Uuid>>;

    async fn count(&self) -> AppResult<u64>;

    /// Sum of `total_amount` over orders that are not cancelled
    async fn total_revenue(&self) -> AppResult<f64>;

    async fn count_by_status(&self) -> AppResult<Vec<(OrderStatus, u64)>>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_order(header: order::Model, items: Vec<OrderItem>) -> AppResult<Order> {
    Ok(Order {
        id: header.id,
        user_id: header.user_id,
        items,
        shipping_address: ShippingAddress {
            street: header.ship_street,
            city: header.ship_city,
            state: header.ship_state,
            country: header.ship_country,
            zip: header.ship_zip,
        },
        subtotal: header.subtotal,
        coupon_code: header.coupon_code,
        discount: header.discount,
        total_amount: header.total_amount,
        is_gift: header.is_gift,
        gift_message: header.gift_message,
        status: header.status.parse::<OrderStatus>()?,
        payment_method: header.payment_method,
        payment_status: header.payment_status.parse::<PaymentStatus>()?,
        tracking_number: header.tracking_number,
        created_at: header.created_at,
        updated_at: header.updated_at,
    })
}

/// Attach lines to headers, keeping header order.
async fn hydrate<C: ConnectionTrait>(db: &C, headers: Vec<order::Model>) -> AppResult<Vec<Order>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
    let mut lines: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for line in OrderItemEntity::find()
        .filter(order_item::Column::OrderId.is_in(ids))
        .order_by_asc(order_item::Column::Position)
        .all(db)
        .await?
    {
        lines.entry(line.order_id).or_default().push(OrderItem::from(line));
    }

    headers
        .into_iter()
        .map(|header| {
            let items = lines.remove(&header.id).unwrap_or_default();
            into_order(header, items)
        })
        .collect()
}

pub(crate) async fn find_order<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Order>> {
    let Some(header) = OrderEntity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    Ok(hydrate(db, vec![header]).await?.pop())
}

pub(crate) async fn insert_order<C: ConnectionTrait>(db: &C, new_order: NewOrder) -> AppResult<Order> {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let address = new_order.shipping_address;

    let header = order::ActiveModel {
        id: Set(id),
        user_id: Set(new_order.user_id),
        ship_street: Set(address.street),
        ship_city: Set(address.city),
        ship_state: Set(address.state),
        ship_country: Set(address.country),
        ship_zip: Set(address.zip),
        subtotal: Set(new_order.subtotal),
        coupon_code: Set(new_order.coupon_code),
        discount: Set(new_order.discount),
        total_amount: Set(new_order.total_amount),
        is_gift: Set(new_order.is_gift),
        gift_message: Set(new_order.gift_message),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_method: Set(new_order.payment_method),
        payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
        tracking_number: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    if !new_order.items.is_empty() {
        let lines = new_order
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name.clone()),
                quantity: Set(item.quantity),
                price: Set(item.price),
                position: Set(position as i32),
            });
        OrderItemEntity::insert_many(lines)
            .exec_without_returning(db)
            .await?;
    }

    into_order(header, new_order.items)
}

/// Persist a status change and its payment side effect.
pub(crate) async fn update_order_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: OrderStatus,
    payment_status: Option<PaymentStatus>,
    tracking_number: Option<String>,
) -> AppResult<Order> {
    let header = OrderEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_not_found("Order")?;

    let mut active: order::ActiveModel = header.into();
    active.status = Set(status.as_str().to_string());
    if let Some(payment_status) = payment_status {
        active.payment_status = Set(payment_status.as_str().to_string());
    }
    if let Some(tracking_number) = tracking_number {
        active.tracking_number = Set(Some(tracking_number));
    }
    active.updated_at = Set(Utc::now());
    let header = active.update(db).await?;

    hydrate(db, vec![header])
        .await?
        .pop()
        .ok_or_else(|| AppError::internal("Order vanished during update"))
}

pub(crate) async fn delete_order<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    let result = OrderEntity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Order"));
    }
    Ok(())
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    revenue: Option<f64>,
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn create(&self, order: NewOrder) -> AppResult<Order> {
        insert_order(&self.db, order).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        find_order(&self.db, id).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let headers = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;
        hydrate(&self.db, headers).await
    }

    async fn list(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }
        let headers = query.all(&self.db).await?;
        hydrate(&self.db, headers).await
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<Order>> {
        let headers = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        hydrate(&self.db, headers).await
    }

    async fn delivered_with_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Vec<Uuid>> {
        let headers = OrderEntity::find()
            .inner_join(OrderItemEntity)
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::Status.eq(OrderStatus::Delivered.as_str()))
            .filter(order_item::Column::ProductId.eq(product_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut ids: Vec<Uuid> = Vec::with_capacity(headers.len());
        for header in headers {
            if !ids.contains(&header.id) {
                ids.push(header.id);
            }
        }
        Ok(ids)
    }

    async fn count(&self) -> AppResult<u64> {
        OrderEntity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn total_revenue(&self) -> AppResult<f64> {
        let row = OrderEntity::find()
            .select_only()
            .column_as(order::Column::TotalAmount.sum(), "revenue")
            .filter(order::Column::Status.ne(OrderStatus::Cancelled.as_str()))
            .into_model::<RevenueRow>()
            .one(&self.db)
            .await?;

        Ok(row.and_then(|r| r.revenue).unwrap_or(0.0))
    }

    async fn count_by_status(&self) -> AppResult<Vec<(OrderStatus, u64)>> {
        let rows = OrderEntity::find()
            .select_only()
            .column(order::Column::Status)
            .column_as(order::Column::Id.count(), "count")
            .group_by(order::Column::Status)
            .into_model::<StatusCountRow>()
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|row| {
                let status = row.status.parse::<OrderStatus>()?;
                Ok((status, u64::try_from(row.count).unwrap_or(0)))
            })
            .collect()
    }
}
