use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems, TransitionRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        profiles::{Column as ProfileCol, Entity as Profiles},
    },
    error::{AppError, AppResult},
    lifecycle::{self, Actor, OrderAction, OrderStatus},
    middleware::auth::AuthUser,
    models::{OrderItem, PaymentMethod, ProductStatus, ProfileSummary},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Buyer's own orders, newest first unless asked otherwise.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::BuyerId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = assemble_orders(&state.orm, orders, user.user_id).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

/// One order, visible to its buyer and its seller.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all().add(OrderCol::Id.eq(id)).add(
                Condition::any()
                    .add(OrderCol::BuyerId.eq(user.user_id))
                    .add(OrderCol::SellerId.eq(user.user_id)),
            ),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let view = assemble_one(&state.orm, order, user.user_id).await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

struct CartLine {
    product: crate::entity::products::Model,
    quantity: i32,
}

/// Turn the caller's cart into one order per seller.
///
/// Runs in a single transaction: cart and product rows are locked, stock is
/// checked and decremented, items are snapshotted and the cart is emptied.
/// A repeated `checkout_key` returns the orders created the first time.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let txn = state.orm.begin().await?;

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    // Checked after taking the cart lock so a concurrent replay sees the first commit.
    if let Some(key) = payload.checkout_key {
        let previous = Orders::find()
            .filter(
                Condition::all()
                    .add(OrderCol::BuyerId.eq(user.user_id))
                    .add(OrderCol::CheckoutKey.eq(key)),
            )
            .order_by_asc(OrderCol::CreatedAt)
            .all(&txn)
            .await?;
        if !previous.is_empty() {
            txn.commit().await?;
            tracing::debug!(checkout_key = %key, "checkout replayed");
            let orders = assemble_orders(&state.orm, previous, user.user_id).await?;
            let total_amount = orders.iter().map(|o| o.order.total_amount).sum();
            return Ok(ApiResponse::success(
                "Đặt hàng thành công!",
                CheckoutResponse {
                    orders,
                    total_amount,
                    replayed: true,
                },
                Some(Meta::empty()),
            ));
        }
    }

    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let product_ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
    let mut products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut by_seller: BTreeMap<Uuid, Vec<CartLine>> = BTreeMap::new();
    for item in &cart {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        let product = products
            .remove(&item.product_id)
            .ok_or_else(|| AppError::BadRequest(format!("Product {} no longer exists", item.product_id)))?;
        if product.status != ProductStatus::Approved.as_str() {
            return Err(AppError::BadRequest(format!(
                "Product {} is not available",
                product.name
            )));
        }
        if product.quantity < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.name
            )));
        }
        by_seller.entry(product.seller_id).or_default().push(CartLine {
            product,
            quantity: item.quantity,
        });
    }

    let buyer = Profiles::find_by_id(user.user_id).one(&txn).await?;
    let shipping_address = payload
        .shipping_address
        .filter(|s| !s.trim().is_empty())
        .or_else(|| buyer.as_ref().and_then(|p| p.address.clone()));
    let shipping_phone = payload
        .shipping_phone
        .filter(|s| !s.trim().is_empty())
        .or_else(|| buyer.as_ref().and_then(|p| p.phone.clone()));
    let payment_method = payload.payment_method.unwrap_or(PaymentMethod::Cod);

    let mut created = Vec::with_capacity(by_seller.len());
    for (seller_id, lines) in by_seller {
        let total_amount = order_total(lines.iter().map(|line| (line.product.price, line.quantity)))
            .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))?;

        let order = OrderActive {
            id: Set(Uuid::new_v4()),
            buyer_id: Set(user.user_id),
            seller_id: Set(seller_id),
            total_amount: Set(total_amount),
            shipping_address: Set(shipping_address.clone()),
            shipping_phone: Set(shipping_phone.clone()),
            payment_method: Set(payment_method.as_str().to_string()),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            notes: Set(payload.notes.clone()),
            checkout_key: Set(payload.checkout_key),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        for line in lines {
            OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(Some(line.product.id)),
                product_name: Set(line.product.name.clone()),
                product_unit: Set(line.product.unit.clone()),
                product_image_url: Set(line.product.image_url.clone()),
                delivery_time: Set(line.product.delivery_time.clone()),
                quantity: Set(line.quantity),
                price: Set(line.product.price),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;

            let remaining = line.product.quantity - line.quantity;
            let mut stock: ProductActive = line.product.into();
            stock.quantity = Set(remaining);
            if remaining == 0 {
                stock.status = Set(ProductStatus::SoldOut.as_str().to_string());
            }
            stock.updated_at = Set(Utc::now().into());
            stock.update(&txn).await?;
        }

        created.push(order);
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let order_ids: Vec<Uuid> = created.iter().map(|o| o.id).collect();
    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_ids": order_ids }),
    )
    .await;
    tracing::info!(buyer_id = %user.user_id, orders = order_ids.len(), "checkout completed");

    let orders = assemble_orders(&state.orm, created, user.user_id).await?;
    let total_amount = orders.iter().map(|o| o.order.total_amount).sum();
    Ok(ApiResponse::success(
        "Đặt hàng thành công!",
        CheckoutResponse {
            orders,
            total_amount,
            replayed: false,
        },
        Some(Meta::empty()),
    ))
}

/// Seller moves the order one step forward.
pub async fn advance(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: TransitionRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    transition(state, user, id, OrderAction::Advance, payload).await
}

/// Buyer confirms a delivered order arrived.
pub async fn confirm_receipt(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: TransitionRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    transition(state, user, id, OrderAction::ConfirmReceipt, payload).await
}

/// Either party cancels a non-terminal order.
pub async fn cancel(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: TransitionRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    transition(state, user, id, OrderAction::Cancel, payload).await
}

/// Sum of `price × quantity` over the lines, or `None` on overflow.
pub fn order_total(lines: impl IntoIterator<Item = (i64, i32)>) -> Option<i64> {
    lines.into_iter().try_fold(0_i64, |acc, (price, quantity)| {
        price
            .checked_mul(i64::from(quantity))
            .and_then(|line| acc.checked_add(line))
    })
}

/// Put a cancelled order's units back on the shelf. Sold-out products become
/// available again; products deleted since checkout are skipped.
async fn restock<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<()> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .filter(OrderItemCol::ProductId.is_not_null())
        .all(conn)
        .await?;

    let mut returned: HashMap<Uuid, i32> = HashMap::new();
    for item in items {
        if let Some(product_id) = item.product_id {
            let slot = returned.entry(product_id).or_default();
            *slot = slot.saturating_add(item.quantity);
        }
    }
    if returned.is_empty() {
        return Ok(());
    }

    let products = Products::find()
        .filter(ProdCol::Id.is_in(returned.keys().copied().collect::<Vec<_>>()))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(conn)
        .await?;

    for product in products {
        let Some(&quantity) = returned.get(&product.id) else {
            continue;
        };
        let restored = product.quantity.saturating_add(quantity);
        let reopen = product.status == ProductStatus::SoldOut.as_str() && restored > 0;
        let product_id = product.id;

        let mut stock: ProductActive = product.into();
        stock.quantity = Set(restored);
        if reopen {
            stock.status = Set(ProductStatus::Approved.as_str().to_string());
        }
        stock.updated_at = Set(Utc::now().into());
        stock.update(conn).await?;
        tracing::debug!(%order_id, %product_id, quantity, "stock returned");
    }

    Ok(())
}

/// Which side `user_id` plays for `action` on this order. A user who is both
/// buyer and seller acts as the seller when advancing, as the buyer otherwise.
pub fn resolve_actor(order: &OrderModel, user_id: Uuid, action: OrderAction) -> Option<Actor> {
    let is_buyer = order.buyer_id == user_id;
    let is_seller = order.seller_id == user_id;
    match (is_buyer, is_seller) {
        (true, true) if action == OrderAction::Advance => Some(Actor::Seller),
        (true, _) => Some(Actor::Buyer),
        (false, true) => Some(Actor::Seller),
        (false, false) => None,
    }
}

async fn transition(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    action: OrderAction,
    payload: TransitionRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let actor = resolve_actor(&order, user.user_id, action).ok_or(AppError::NotFound)?;

    let current = order
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    if let Some(expected) = payload.expected_status {
        if expected != current {
            return Err(AppError::Conflict(format!(
                "order is {current}, expected {expected}"
            )));
        }
    }

    let next = match lifecycle::apply(current, action, actor) {
        Ok(next) => next,
        Err(err) => {
            tracing::warn!(order_id = %id, %actor, error = %err, "order transition refused");
            return Err(err.into());
        }
    };

    if next == OrderStatus::Cancelled {
        restock(&txn, order.id).await?;
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %id, %actor, from = %current, to = %next, "order status changed");
    audit::record(
        &state.pool,
        user.user_id,
        "order_status",
        "orders",
        serde_json::json!({
            "order_id": id,
            "actor": actor.to_string(),
            "from": current,
            "to": next,
        }),
    )
    .await;

    let view = assemble_one(&state.orm, order, user.user_id).await?;
    Ok(ApiResponse::success(
        format!("Cập nhật trạng thái: {}", next.label()),
        view,
        Some(Meta::empty()),
    ))
}

pub(crate) async fn assemble_one<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
    viewer: Uuid,
) -> AppResult<OrderWithItems> {
    assemble_orders(conn, vec![order], viewer)
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

/// Attach items, party summaries, timeline and the viewer's actions.
pub(crate) async fn assemble_orders<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
    viewer: Uuid,
) -> AppResult<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
    {
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(item.into());
    }

    let party_ids: HashSet<Uuid> = orders
        .iter()
        .flat_map(|o| [o.buyer_id, o.seller_id])
        .collect();
    let profiles: HashMap<Uuid, ProfileSummary> = Profiles::find()
        .filter(ProfileCol::Id.is_in(party_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, ProfileSummary::from(p)))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            let parsed = order.status.parse::<OrderStatus>().ok();

            let mut actions: Vec<OrderAction> = Vec::new();
            let mut seller_prompt = None;
            if let Some(status) = parsed {
                if order.seller_id == viewer {
                    actions.extend(lifecycle::available_actions(status, Actor::Seller));
                    seller_prompt = Some(lifecycle::seller_prompt(status));
                }
                if order.buyer_id == viewer {
                    for action in lifecycle::available_actions(status, Actor::Buyer) {
                        if !actions.contains(&action) {
                            actions.push(action);
                        }
                    }
                }
            }

            OrderWithItems {
                buyer: profiles.get(&order.buyer_id).cloned(),
                seller: profiles.get(&order.seller_id).cloned(),
                status_label: lifecycle::status_label(&order.status),
                timeline: lifecycle::timeline(&order.status),
                delivery_time: latest_delivery_time(&items),
                actions,
                seller_prompt,
                items,
                order: order.into(),
            }
        })
        .collect())
}

/// Pick the slowest delivery estimate, ranked by the largest number it mentions
/// ("1-2 ngày" < "3-5 ngày"). Estimates without digits rank lowest.
pub fn latest_delivery_time(items: &[OrderItem]) -> Option<String> {
    items
        .iter()
        .filter_map(|item| item.delivery_time.as_deref())
        .filter(|t| !t.trim().is_empty())
        .max_by_key(|t| largest_number(t))
        .map(str::to_string)
}

fn largest_number(text: &str) -> u32 {
    text.split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(delivery: Option<&str>) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            product_id: None,
            product_name: "Rau muống".into(),
            product_unit: Some("bó".into()),
            product_image_url: None,
            delivery_time: delivery.map(str::to_string),
            quantity: 1,
            price: 10_000,
            created_at: Utc::now(),
        }
    }

    fn order(buyer: Uuid, seller: Uuid) -> OrderModel {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        OrderModel {
            id: Uuid::new_v4(),
            buyer_id: buyer,
            seller_id: seller,
            total_amount: 0,
            shipping_address: None,
            shipping_phone: None,
            payment_method: "cod".into(),
            status: "pending".into(),
            notes: None,
            checkout_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn order_total_sums_lines_and_rejects_overflow() {
        assert_eq!(order_total([(15_000, 3), (35_000, 1)]), Some(80_000));
        assert_eq!(order_total(std::iter::empty()), Some(0));
        assert_eq!(order_total([(i64::MAX, 2)]), None);
        assert_eq!(order_total([(i64::MAX, 1), (1, 1)]), None);
    }

    #[test]
    fn slowest_delivery_estimate_wins() {
        let items = vec![item(Some("1-2 ngày")), item(None), item(Some("3-5 ngày"))];
        assert_eq!(latest_delivery_time(&items).as_deref(), Some("3-5 ngày"));
        assert_eq!(latest_delivery_time(&[item(None)]), None);
    }

    #[test]
    fn actor_follows_order_parties() {
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        let o = order(buyer, seller);
        assert_eq!(resolve_actor(&o, buyer, OrderAction::Cancel), Some(Actor::Buyer));
        assert_eq!(resolve_actor(&o, seller, OrderAction::Advance), Some(Actor::Seller));
        assert_eq!(resolve_actor(&o, Uuid::new_v4(), OrderAction::Cancel), None);
    }

    #[test]
    fn self_purchase_advances_as_seller() {
        let me = Uuid::new_v4();
        let o = order(me, me);
        assert_eq!(resolve_actor(&o, me, OrderAction::Advance), Some(Actor::Seller));
        assert_eq!(
            resolve_actor(&o, me, OrderAction::ConfirmReceipt),
            Some(Actor::Buyer)
        );
    }
}
