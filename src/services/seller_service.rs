use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use sea_orm::sea_query::Expr;

use crate::{
    dto::{orders::OrderList, products::ProductList, seller::DashboardStats},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::AppResult,
    lifecycle::OrderStatus,
    middleware::auth::{AuthUser, ensure_seller},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{OrderScope, SellerOrderQuery},
    services::order_service::assemble_orders,
    state::AppState,
};

fn terminal_statuses() -> Vec<&'static str> {
    OrderStatus::ALL
        .iter()
        .filter(|s| s.is_terminal())
        .map(|s| s.as_str())
        .collect()
}

fn scope_condition(scope: OrderScope) -> Condition {
    match scope {
        OrderScope::Active => Condition::all().add(OrderCol::Status.is_not_in(terminal_statuses())),
        OrderScope::Completed => Condition::all().add(OrderCol::Status.is_in(terminal_statuses())),
        OrderScope::All => Condition::all(),
    }
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    revenue: Option<i64>,
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_seller(user)?;

    let total_products = Products::find()
        .filter(ProdCol::SellerId.eq(user.user_id))
        .count(&state.orm)
        .await? as i64;

    let own_orders = Orders::find().filter(OrderCol::SellerId.eq(user.user_id));
    let total_orders = own_orders.clone().count(&state.orm).await? as i64;
    let active_orders = own_orders
        .clone()
        .filter(scope_condition(OrderScope::Active))
        .count(&state.orm)
        .await? as i64;
    let completed_orders = own_orders
        .clone()
        .filter(OrderCol::Status.eq(OrderStatus::Received.as_str()))
        .count(&state.orm)
        .await? as i64;

    let revenue = own_orders
        .filter(OrderCol::Status.ne(OrderStatus::Cancelled.as_str()))
        .select_only()
        .column_as(Expr::cust("SUM(total_amount)::BIGINT"), "revenue")
        .into_model::<RevenueRow>()
        .one(&state.orm)
        .await?
        .and_then(|row| row.revenue)
        .unwrap_or(0);

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardStats {
            total_products,
            total_orders,
            total_revenue: revenue,
            active_orders,
            completed_orders,
        },
        Some(Meta::empty()),
    ))
}

/// Orders placed with the caller's shop.
pub async fn list_seller_orders(
    state: &AppState,
    user: &AuthUser,
    query: SellerOrderQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Orders::find()
        .filter(OrderCol::SellerId.eq(user.user_id))
        .filter(scope_condition(query.scope.unwrap_or_default()))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = assemble_orders(&state.orm, orders, user.user_id).await?;

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Every product of the caller's shop, whatever its status.
pub async fn list_seller_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_seller(user)?;
    let items: Vec<Product> = Products::find()
        .filter(ProdCol::SellerId.eq(user.user_id))
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::whole(total)),
    ))
}
