//! Order status lifecycle.
//!
//! Sellers walk an order forward along a fixed table, buyers confirm receipt
//! of delivered orders, and either party may cancel while the order is still
//! open. `received` and `cancelled` are absorbing.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipping,
    Delivered,
    Received,
    Cancelled,
}

/// Forward steps in display order. `cancelled` is a separate branch.
pub const TIMELINE_STEPS: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipping,
    OrderStatus::Delivered,
    OrderStatus::Received,
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipping,
        OrderStatus::Delivered,
        OrderStatus::Received,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Chờ xác nhận",
            OrderStatus::Confirmed => "Đã xác nhận",
            OrderStatus::Processing => "Đang xử lý",
            OrderStatus::Shipping => "Đang giao hàng",
            OrderStatus::Delivered => "Đã giao hàng",
            OrderStatus::Received => "Đã nhận hàng",
            OrderStatus::Cancelled => "Đã hủy",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Received | OrderStatus::Cancelled)
    }

    /// Next status when the seller advances the order.
    ///
    /// New orders go straight from `pending` to `shipping`; `confirmed` and
    /// `processing` still advance for rows that already hold them.
    pub fn seller_next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Shipping),
            OrderStatus::Confirmed => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipping),
            OrderStatus::Shipping => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Received | OrderStatus::Cancelled => None,
        }
    }

    fn timeline_position(self) -> Option<usize> {
        TIMELINE_STEPS.iter().position(|s| *s == self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Which side of the order is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Buyer,
    Seller,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Buyer => f.write_str("buyer"),
            Actor::Seller => f.write_str("seller"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Advance,
    ConfirmReceipt,
    Cancel,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Advance => f.write_str("advance"),
            OrderAction::ConfirmReceipt => f.write_str("confirm receipt of"),
            OrderAction::Cancel => f.write_str("cancel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("order is {0} and can no longer change")]
    Terminal(OrderStatus),
    #[error("cannot {action} an order that is {from}")]
    NotAllowed { action: OrderAction, from: OrderStatus },
    #[error("the {actor} cannot {action} an order")]
    WrongActor { actor: Actor, action: OrderAction },
}

/// Resolve the status an action leads to, or why it is refused.
pub fn apply(
    current: OrderStatus,
    action: OrderAction,
    actor: Actor,
) -> Result<OrderStatus, TransitionError> {
    if current.is_terminal() {
        return Err(TransitionError::Terminal(current));
    }

    match action {
        OrderAction::Advance => {
            if actor != Actor::Seller {
                return Err(TransitionError::WrongActor { actor, action });
            }
            current
                .seller_next()
                .ok_or(TransitionError::NotAllowed { action, from: current })
        }
        OrderAction::ConfirmReceipt => {
            if actor != Actor::Buyer {
                return Err(TransitionError::WrongActor { actor, action });
            }
            if current != OrderStatus::Delivered {
                return Err(TransitionError::NotAllowed { action, from: current });
            }
            Ok(OrderStatus::Received)
        }
        OrderAction::Cancel => Ok(OrderStatus::Cancelled),
    }
}

pub fn advance(current: OrderStatus, actor: Actor) -> Result<OrderStatus, TransitionError> {
    apply(current, OrderAction::Advance, actor)
}

pub fn confirm_receipt(current: OrderStatus, actor: Actor) -> Result<OrderStatus, TransitionError> {
    apply(current, OrderAction::ConfirmReceipt, actor)
}

pub fn cancel(current: OrderStatus, actor: Actor) -> Result<OrderStatus, TransitionError> {
    apply(current, OrderAction::Cancel, actor)
}

/// Actions `actor` may take right now, in the order a UI would offer them.
pub fn available_actions(current: OrderStatus, actor: Actor) -> Vec<OrderAction> {
    [
        OrderAction::Advance,
        OrderAction::ConfirmReceipt,
        OrderAction::Cancel,
    ]
    .into_iter()
    .filter(|action| apply(current, *action, actor).is_ok())
    .collect()
}

/// Copy shown on the seller's status button and its confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusPrompt {
    pub next: Option<OrderStatus>,
    pub enabled: bool,
    pub button_label: String,
    pub dialog_text: String,
    pub confirm_text: String,
    pub cancel_text: String,
}

pub fn seller_prompt(current: OrderStatus) -> StatusPrompt {
    let (button_label, dialog_text) = match current {
        OrderStatus::Pending => ("Xác nhận", "Xác nhận đơn hàng và tiến hành giao hàng?"),
        OrderStatus::Confirmed => ("Xử lý đơn hàng", "Bắt đầu xử lý đơn hàng?"),
        OrderStatus::Processing => ("Giao hàng", "Bắt đầu giao hàng?"),
        OrderStatus::Shipping => (
            "Xác nhận đã giao hàng",
            "Cập nhật trạng thái thành đã giao hàng?",
        ),
        OrderStatus::Delivered => ("Đang chờ khách hàng xác nhận", ""),
        OrderStatus::Received => ("Đơn hàng đã hoàn thành", ""),
        OrderStatus::Cancelled => ("Đơn hàng đã bị hủy", ""),
    };
    let next = current.seller_next();
    let (confirm_text, cancel_text) = if next.is_some() {
        ("Xác nhận", "Hủy")
    } else {
        ("", "")
    };

    StatusPrompt {
        next,
        enabled: next.is_some(),
        button_label: button_label.to_string(),
        dialog_text: dialog_text.to_string(),
        confirm_text: confirm_text.to_string(),
        cancel_text: cancel_text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimelineStep {
    pub key: OrderStatus,
    pub label: String,
    pub completed: bool,
    pub current: bool,
}

/// Progress view of an order. Built from the raw column value so that rows
/// holding an unexpected status still render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Timeline {
    pub status: String,
    pub label: String,
    pub steps: Vec<TimelineStep>,
    pub cancelled: bool,
}

pub fn timeline(raw_status: &str) -> Timeline {
    let parsed = raw_status.parse::<OrderStatus>().ok();
    let position = parsed.and_then(OrderStatus::timeline_position);

    let steps = TIMELINE_STEPS
        .iter()
        .enumerate()
        .map(|(idx, step)| TimelineStep {
            key: *step,
            label: step.label().to_string(),
            completed: position.is_some_and(|pos| idx <= pos),
            current: position == Some(idx),
        })
        .collect();

    Timeline {
        status: raw_status.to_string(),
        label: status_label(raw_status),
        steps,
        cancelled: parsed == Some(OrderStatus::Cancelled),
    }
}

/// Badge text for a stored status, falling back to the raw value.
pub fn status_label(raw_status: &str) -> String {
    raw_status
        .parse::<OrderStatus>()
        .map(|status| status.label().to_string())
        .unwrap_or_else(|_| raw_status.to_string())
}
