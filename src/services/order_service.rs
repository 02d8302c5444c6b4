//! Order service - Checkout and order lifecycle.
//!
//! Checkout, cancellation, status changes and admin deletion each run in a
//! single transaction. Stock is taken with a guarded decrement and coupon
//! usage with a guarded increment, so an error on any step rolls back every
//! earlier write and concurrent checkouts cannot oversell or over-redeem.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::coupon::{normalize_code, round_money};
use crate::domain::order::total_after_discount;
use crate::domain::{
    NewOrder, Order, OrderItem, OrderStatus, PlaceOrder, ShippingAddress, StatusTransition,
    UpdateOrderStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{TransactionContext, UnitOfWork};

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the caller's cart into a pending order
    async fn place_order(&self, user_id: Uuid, request: PlaceOrder) -> AppResult<Order>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

    /// An order visible to the requester: their own, or any for admins
    async fn get_order(&self, requester_id: Uuid, is_admin: bool, order_id: Uuid)
        -> AppResult<Order>;

    /// Owner cancellation of a pending or processing order
    async fn cancel(&self, user_id: Uuid, order_id: Uuid) -> AppResult<Order>;

    /// Owner removal of a cancelled or delivered order
    async fn delete_for_user(&self, user_id: Uuid, order_id: Uuid) -> AppResult<()>;

    async fn list_all(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>>;

    async fn update_status(&self, order_id: Uuid, update: UpdateOrderStatus) -> AppResult<Order>;

    /// Admin removal; orders still holding stock give it back
    async fn delete(&self, order_id: Uuid) -> AppResult<()>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn insufficient_stock(name: &str, stock: i32) -> AppError {
    AppError::validation(format!(
        "Insufficient stock for {}. Only {} left",
        name, stock
    ))
}

async fn load_order(ctx: &TransactionContext<'_>, order_id: Uuid) -> AppResult<Order> {
    ctx.orders()
        .find_by_id(order_id)
        .await?
        .ok_or_not_found("Order")
}

/// Persist a planned transition, returning stock first when it asks for it.
async fn apply_transition(
    ctx: &TransactionContext<'_>,
    order: &Order,
    transition: StatusTransition,
    tracking_number: Option<String>,
) -> AppResult<Order> {
    if transition.restock {
        for item in &order.items {
            ctx.products().restock(item.product_id, item.quantity).await?;
        }
    }

    ctx.orders()
        .update_status(
            order.id,
            transition.to,
            transition.payment_status,
            tracking_number,
        )
        .await
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn place_order(&self, user_id: Uuid, request: PlaceOrder) -> AppResult<Order> {
        let order = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.users()
                        .find_by_id(user_id)
                        .await?
                        .ok_or_not_found("User")?;

                    let address = ctx
                        .addresses()
                        .find(user_id, request.address_id)
                        .await?
                        .ok_or_not_found("Address")?;

                    let cart = match ctx.carts().find_by_user(user_id).await? {
                        Some(cart) if !cart.is_empty() => cart,
                        _ => return Err(AppError::validation("Cart is empty")),
                    };

                    let mut items = Vec::with_capacity(cart.items.len());
                    let mut subtotal = 0.0;
                    for line in &cart.items {
                        let product = ctx
                            .products()
                            .find_by_id(line.product_id)
                            .await?
                            .ok_or_not_found("Product")?;

                        if !product.has_stock_for(line.quantity)
                            || !ctx
                                .products()
                                .try_decrement_stock(product.id, line.quantity)
                                .await?
                        {
                            return Err(insufficient_stock(&product.name, product.stock));
                        }

                        let item = OrderItem {
                            product_id: product.id,
                            product_name: product.name,
                            quantity: line.quantity,
                            price: product.price,
                        };
                        subtotal += item.line_total();
                        items.push(item);
                    }
                    let subtotal = round_money(subtotal);

                    let mut coupon_code = None;
                    let mut discount = 0.0;
                    if let Some(code) = request.coupon_code.as_deref() {
                        let coupon = ctx
                            .coupons()
                            .find_by_code(&normalize_code(code))
                            .await?
                            .ok_or_else(|| AppError::validation("Invalid coupon code"))?;

                        let validation = coupon.is_valid(subtotal, Utc::now());
                        if !validation.valid {
                            return Err(AppError::validation(validation.message));
                        }
                        if !ctx.coupons().try_increment_usage(coupon.id).await? {
                            return Err(AppError::validation("Coupon usage limit reached"));
                        }

                        discount = coupon.calculate_discount(subtotal);
                        coupon_code = Some(coupon.code);
                    }

                    let order = ctx
                        .orders()
                        .create(NewOrder {
                            user_id,
                            items,
                            shipping_address: ShippingAddress::from(&address),
                            subtotal,
                            coupon_code,
                            discount,
                            total_amount: total_after_discount(subtotal, discount),
                            is_gift: request.is_gift,
                            gift_message: request.gift_message,
                            payment_method: request.payment_method,
                        })
                        .await?;

                    ctx.carts().clear(user_id).await?;
                    Ok(order)
                })
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        self.uow.orders().list_for_user(user_id).await
    }

    async fn get_order(
        &self,
        requester_id: Uuid,
        is_admin: bool,
        order_id: Uuid,
    ) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order")?;

        if !is_admin && !order.belongs_to(requester_id) {
            return Err(AppError::forbidden("You do not have access to this order"));
        }
        Ok(order)
    }

    async fn cancel(&self, user_id: Uuid, order_id: Uuid) -> AppResult<Order> {
        let order = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let order = load_order(&ctx, order_id).await?;
                    if !order.belongs_to(user_id) {
                        return Err(AppError::forbidden("You can only cancel your own orders"));
                    }

                    let transition = order.plan_cancellation()?;
                    apply_transition(&ctx, &order, transition, None).await
                })
            })
            .await?;

        tracing::info!(order_id = %order_id, user_id = %user_id, "Order cancelled");
        Ok(order)
    }

    async fn delete_for_user(&self, user_id: Uuid, order_id: Uuid) -> AppResult<()> {
        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order")?;

        if !order.belongs_to(user_id) {
            return Err(AppError::forbidden("You can only delete your own orders"));
        }
        order.ensure_deletable_by_owner()?;

        self.uow
            .transaction(move |ctx| Box::pin(async move { ctx.orders().delete(order_id).await }))
            .await
    }

    async fn list_all(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        self.uow.orders().list(status).await
    }

    async fn update_status(&self, order_id: Uuid, update: UpdateOrderStatus) -> AppResult<Order> {
        let order = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let order = load_order(&ctx, order_id).await?;
                    let transition = order.plan_status_change(update.status)?;

                    if transition.to == order.status && update.tracking_number.is_none() {
                        return Ok(order);
                    }
                    apply_transition(&ctx, &order, transition, update.tracking_number).await
                })
            })
            .await?;

        tracing::info!(order_id = %order_id, status = %order.status, "Order status updated");
        Ok(order)
    }

    async fn delete(&self, order_id: Uuid) -> AppResult<()> {
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let order = load_order(&ctx, order_id).await?;
                    if order.status.is_in_flight() {
                        for item in &order.items {
                            ctx.products().restock(item.product_id, item.quantity).await?;
                        }
                    }
                    ctx.orders().delete(order_id).await
                })
            })
            .await?;

        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}
