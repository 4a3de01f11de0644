use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::OrderList,
        products::{ProductList, UpdateProductStatusRequest},
        seller::DashboardStats,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::SellerOrderQuery,
    services::{product_service, seller_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/orders", get(list_seller_orders))
        .route("/products", get(list_seller_products))
        .route("/products/{id}/status", patch(set_product_status))
}

#[utoipa::path(
    get,
    path = "/api/seller/dashboard",
    responses(
        (status = 200, description = "Shop statistics", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Caller is not a seller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = seller_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("scope" = Option<String>, Query, description = "active | completed | all, default active"),
    ),
    responses(
        (status = 200, description = "Orders placed with the shop", body = ApiResponse<OrderList>),
        (status = 403, description = "Caller is not a seller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_seller_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SellerOrderQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = seller_service::list_seller_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/products",
    responses(
        (status = 200, description = "Shop products in any status", body = ApiResponse<ProductList>),
        (status = 403, description = "Caller is not a seller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_seller_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = seller_service::list_seller_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/seller/products/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductStatusRequest,
    responses(
        (status = 200, description = "Product status changed", body = ApiResponse<Product>),
        (status = 403, description = "Not the product's seller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn set_product_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductStatusRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::set_product_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
