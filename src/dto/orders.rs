use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    lifecycle::{OrderAction, OrderStatus, StatusPrompt, Timeline},
    models::{Order, OrderItem, PaymentMethod, ProfileSummary},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Defaults to the buyer's profile address.
    pub shipping_address: Option<String>,
    /// Defaults to the buyer's profile phone.
    pub shipping_phone: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    /// Replaying a checkout with the same key returns the orders it created.
    pub checkout_key: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub orders: Vec<OrderWithItems>,
    pub total_amount: i64,
    pub replayed: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Status the caller last saw; a mismatch is reported as a conflict.
    pub expected_status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub buyer: Option<ProfileSummary>,
    pub seller: Option<ProfileSummary>,
    pub status_label: String,
    pub timeline: Timeline,
    /// Actions open to the requesting user.
    pub actions: Vec<OrderAction>,
    /// Present when the requesting user is the seller.
    pub seller_prompt: Option<StatusPrompt>,
    /// Latest delivery estimate among the items.
    pub delivery_time: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}
