use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Order, OrderStatus, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// Admin dashboard aggregate
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_categories: u64,
    /// Sum of `totalAmount` over orders that were not cancelled
    pub total_revenue: f64,
    pub recent_orders: Vec<Order>,
    pub low_stock_products: Vec<Product>,
    pub orders_by_status: Vec<StatusCount>,
}

/// One entry per known status, zero when the store reported none.
pub fn status_breakdown(counts: &[(OrderStatus, u64)]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: counts
                .iter()
                .filter(|(s, _)| *s == status)
                .map(|(_, c)| *c)
                .sum(),
        })
        .collect()
}
