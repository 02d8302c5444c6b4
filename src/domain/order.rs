//! Order snapshot and status transition rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::Address;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Customers may cancel before the parcel leaves.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    /// Order still has stock reserved that a deletion must give back.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Shipped
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown order status: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Payment state after the order is cancelled.
    pub fn after_cancellation(self) -> PaymentStatus {
        match self {
            PaymentStatus::Completed => PaymentStatus::Refunded,
            _ => PaymentStatus::Cancelled,
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(AppError::validation(format!("Unknown payment status: {}", other))),
        }
    }
}

/// Copy of the user's address at checkout time
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            country: address.country.clone(),
            zip: address.zip.clone(),
        }
    }
}

/// Line captured with the price paid
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub subtotal: f64,
    pub coupon_code: Option<String>,
    pub discount: f64,
    pub total_amount: f64,
    pub is_gift: bool,
    pub gift_message: Option<String>,
    pub status: OrderStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to persist a freshly placed order
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub subtotal: f64,
    pub coupon_code: Option<String>,
    pub discount: f64,
    pub total_amount: f64,
    pub is_gift: bool,
    pub gift_message: Option<String>,
    pub payment_method: String,
}

/// Side effects of moving an order between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub to: OrderStatus,
    /// Put every line's quantity back on the shelf
    pub restock: bool,
    pub payment_status: Option<PaymentStatus>,
}

impl Order {
    pub fn belongs_to(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    /// Customer-initiated cancellation.
    pub fn plan_cancellation(&self) -> AppResult<StatusTransition> {
        if !self.status.is_cancellable() {
            return Err(AppError::validation(format!(
                "Order cannot be cancelled once it is {}",
                self.status
            )));
        }
        self.plan_status_change(OrderStatus::Cancelled)
    }

    /// Admin status update.
    ///
    /// Leaving `delivered` or entering `cancelled` restocks (once, even when
    /// both apply). Entering `delivered` completes the payment; entering
    /// `cancelled` refunds completed payments and cancels the rest.
    /// Cancelled orders are final.
    pub fn plan_status_change(&self, to: OrderStatus) -> AppResult<StatusTransition> {
        let from = self.status;
        if from == to {
            return Ok(StatusTransition {
                to,
                restock: false,
                payment_status: None,
            });
        }
        if from == OrderStatus::Cancelled {
            return Err(AppError::validation("Cancelled orders cannot change status"));
        }

        let restock = to == OrderStatus::Cancelled || from == OrderStatus::Delivered;
        let payment_status = match to {
            OrderStatus::Cancelled => Some(self.payment_status.after_cancellation()),
            OrderStatus::Delivered => Some(PaymentStatus::Completed),
            _ => None,
        };

        Ok(StatusTransition {
            to,
            restock,
            payment_status,
        })
    }

    /// Customers may only remove finished orders from their history.
    pub fn ensure_deletable_by_owner(&self) -> AppResult<()> {
        match self.status {
            OrderStatus::Cancelled | OrderStatus::Delivered => Ok(()),
            status => Err(AppError::validation(format!(
                "Only cancelled or delivered orders can be deleted (order is {})",
                status
            ))),
        }
    }
}

/// Total never goes negative because discounts are clamped to the subtotal.
pub fn total_after_discount(subtotal: f64, discount: f64) -> f64 {
    crate::domain::coupon::round_money((subtotal - discount).max(0.0))
}

/// Checkout payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub address_id: Uuid,
    #[serde(default)]
    pub is_gift: bool,
    #[validate(length(max = 500, message = "Gift message cannot exceed 500 characters"))]
    pub gift_message: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Payment method is required"))]
    #[schema(example = "cod")]
    pub payment_method: String,
    #[validate(length(min = 1, max = 50))]
    pub coupon_code: Option<String>,
}

/// Admin status update payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: Option<String>,
}
