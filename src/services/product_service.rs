use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        CategoryList, CreateProductRequest, ProductList, UpdateProductRequest,
        UpdateProductStatusRequest,
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::{Product, ProductStatus},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSort},
    state::AppState,
};

/// Public catalog: approved products only.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(Column::Status.eq(ProductStatus::Approved.as_str()));

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{}%", search)));
    }

    if let Some(name) = query.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(CategoryCol::Name.eq(name))
            .one(&state.orm)
            .await?;
        match category {
            Some(c) => condition = condition.add(Column::CategoryId.eq(c.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        }
    }

    if let Some(location) = query.location.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Location).ilike(format!("%{}%", location)));
    }

    if let Some(range) = query.price_range {
        let (min, max) = range.bounds();
        if let Some(min) = min {
            condition = condition.add(Column::Price.gte(min));
        }
        if let Some(max) = max {
            condition = condition.add(Column::Price.lte(max));
        }
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let mut finder = Products::find().filter(condition);
    finder = match query.sort.unwrap_or(ProductSort::Newest) {
        ProductSort::Newest => finder.order_by_desc(Column::CreatedAt),
        ProductSort::PriceLow => finder.order_by_asc(Column::Price),
        ProductSort::PriceHigh => finder.order_by_desc(Column::Price),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

/// Product detail; every read counts as a view.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::update_many()
        .col_expr(Column::Views, Expr::col(Column::Views).add(1))
        .filter(Column::Id.eq(id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

fn validate_pricing(price: i64, quantity: i32, original_price: Option<i64>) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("Price must be greater than zero".into()));
    }
    if quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".into()));
    }
    if original_price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("Original price cannot be negative".into()));
    }
    Ok(())
}

async fn ensure_category(state: &AppState, id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::BadRequest(format!("Unknown category {id}")));
    }
    Ok(())
}

/// Load a product owned by the caller.
async fn owned_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ProductModel> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if product.seller_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(product)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    validate_pricing(payload.price, payload.quantity, payload.original_price)?;
    ensure_category(state, payload.category_id).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        seller_id: Set(user.user_id),
        category_id: Set(Some(payload.category_id)),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        original_price: Set(payload.original_price),
        unit: Set(payload.unit),
        quantity: Set(payload.quantity),
        image_url: Set(payload.image_url),
        location: Set(payload.location),
        origin: Set(payload.origin),
        certification: Set(payload.certification),
        delivery_time: Set(payload.delivery_time),
        status: Set(ProductStatus::Pending.as_str().to_string()),
        views: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Thêm sản phẩm thành công!",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let existing = owned_product(state, user, id).await?;

    validate_pricing(
        payload.price.unwrap_or(existing.price),
        payload.quantity.unwrap_or(existing.quantity),
        payload.original_price,
    )?;
    if let Some(category_id) = payload.category_id {
        ensure_category(state, category_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(original_price) = payload.original_price {
        active.original_price = Set(Some(original_price));
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(Some(unit));
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(location) = payload.location {
        active.location = Set(Some(location));
    }
    if let Some(origin) = payload.origin {
        active.origin = Set(Some(origin));
    }
    if let Some(certification) = payload.certification {
        active.certification = Set(Some(certification));
    }
    if let Some(delivery_time) = payload.delivery_time {
        active.delivery_time = Set(Some(delivery_time));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cập nhật sản phẩm thành công!",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn set_product_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductStatusRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let existing = owned_product(state, user, id).await?;
    let previous = existing.status.clone();

    let mut active: ActiveModel = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    tracing::info!(
        product_id = %product.id,
        from = %previous,
        to = %payload.status,
        "product status changed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "product_status",
        "products",
        serde_json::json!({ "product_id": product.id, "from": previous, "to": payload.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cập nhật trạng thái thành công!",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_seller(user)?;
    owned_product(state, user, id).await?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Đã xóa sản phẩm",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
