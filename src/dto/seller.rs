use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    /// Sum of order totals, cancelled orders excluded.
    pub total_revenue: i64,
    pub active_orders: i64,
    pub completed_orders: i64,
}
