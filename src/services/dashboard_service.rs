//! Admin dashboard aggregation.

use async_trait::async_trait;
use std::sync::Arc;

use super::container::parallel;
use crate::config::{DASHBOARD_LIST_SIZE, LOW_STOCK_THRESHOLD};
use crate::domain::coupon::round_money;
use crate::domain::dashboard::status_breakdown;
use crate::domain::DashboardStats;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn stats(&self) -> AppResult<DashboardStats>;
}

pub struct DashboardManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DashboardManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DashboardService for DashboardManager<U> {
    async fn stats(&self) -> AppResult<DashboardStats> {
        let users = self.uow.users();
        let products = self.uow.products();
        let orders = self.uow.orders();
        let categories = self.uow.categories();

        let (total_users, total_products, total_orders, total_categories) = parallel::join4(
            users.count(),
            products.count(),
            orders.count(),
            categories.count(),
        )
        .await?;

        let (total_revenue, recent_orders, low_stock_products, by_status) = parallel::join4(
            orders.total_revenue(),
            orders.recent(DASHBOARD_LIST_SIZE),
            products.low_stock(LOW_STOCK_THRESHOLD, DASHBOARD_LIST_SIZE),
            orders.count_by_status(),
        )
        .await?;

        Ok(DashboardStats {
            total_users,
            total_products,
            total_orders,
            total_categories,
            total_revenue: round_money(total_revenue),
            recent_orders,
            low_stock_products,
            orders_by_status: status_breakdown(&by_status),
        })
    }
}
