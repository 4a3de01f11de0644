use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, ProductStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = CartItems::find()
        .find_also_related(Products)
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items: Vec<CartItemDto> = rows
        .into_iter()
        .filter_map(|(item, product)| {
            let product = product?;
            Some(CartItemDto {
                id: item.id,
                line_total: product.price.saturating_mul(i64::from(item.quantity)),
                product: product.into(),
                quantity: item.quantity,
            })
        })
        .collect();
    let total_amount = items
        .iter()
        .fold(0_i64, |acc, item| acc.saturating_add(item.line_total));
    let total = items.len() as i64;

    let meta = Meta::whole(total);
    Ok(ApiResponse::success(
        "OK",
        CartList {
            items,
            total_amount,
        },
        Some(meta),
    ))
}

/// Add a product, or grow the quantity when it is already in the cart. The
/// stored quantity is capped at the product's stock.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be positive".into()));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if product.status != ProductStatus::Approved.as_str() {
        return Err(AppError::BadRequest("Product is not available".into()));
    }

    if payload.quantity > product.quantity {
        return Err(AppError::BadRequest("Quantity exceeds available stock".into()));
    }

    // Concurrent adds of the same product sum on the unique (user, product) key,
    // and the running total never exceeds the stock on hand.
    let on_conflict = OnConflict::columns([CartCol::UserId, CartCol::ProductId])
        .value(
            CartCol::Quantity,
            Expr::cust(format!(
                "LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, {})::INTEGER",
                product.quantity
            )),
        )
        .to_owned();

    let item = CartItems::insert(CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    })
    .on_conflict(on_conflict)
    .exec_with_returning(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": item.quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Đã thêm vào giỏ hàng!",
        item.into(),
        Some(Meta::empty()),
    ))
}

async fn owned_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<crate::entity::cart_items::Model> {
    CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// Set an item's quantity. Zero or less removes it, and `data` is then `null`.
pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<Option<CartItem>>> {
    let item = owned_item(state, user, id).await?;

    if payload.quantity <= 0 {
        CartItems::delete_by_id(item.id).exec(&state.orm).await?;
        return Ok(ApiResponse::success(
            "Đã xóa sản phẩm khỏi giỏ hàng",
            None,
            Some(Meta::empty()),
        ));
    }

    let stock = Products::find_by_id(item.product_id)
        .one(&state.orm)
        .await?
        .map(|product| product.quantity)
        .unwrap_or(0);
    if payload.quantity > stock {
        return Err(AppError::BadRequest("Quantity exceeds available stock".into()));
    }

    let mut active: CartActive = item.into();
    active.quantity = Set(payload.quantity);
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        Some(item.into()),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Đã xóa sản phẩm khỏi giỏ hàng",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
