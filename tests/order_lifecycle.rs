use cho_cuu_nong::lifecycle::{
    self, Actor, OrderAction, OrderStatus, TIMELINE_STEPS, TransitionError,
};

#[test]
fn seller_forward_table() {
    let table = [
        (OrderStatus::Pending, Some(OrderStatus::Shipping)),
        (OrderStatus::Confirmed, Some(OrderStatus::Processing)),
        (OrderStatus::Processing, Some(OrderStatus::Shipping)),
        (OrderStatus::Shipping, Some(OrderStatus::Delivered)),
        (OrderStatus::Delivered, None),
        (OrderStatus::Received, None),
        (OrderStatus::Cancelled, None),
    ];

    for (from, to) in table {
        assert_eq!(from.seller_next(), to, "seller_next({from})");
        assert_eq!(lifecycle::advance(from, Actor::Seller).ok(), to, "advance({from})");
    }
}

#[test]
fn buyer_cannot_advance() {
    let err = lifecycle::advance(OrderStatus::Pending, Actor::Buyer).unwrap_err();
    assert_eq!(
        err,
        TransitionError::WrongActor {
            actor: Actor::Buyer,
            action: OrderAction::Advance
        }
    );
}

#[test]
fn delivered_waits_for_the_buyer() {
    assert_eq!(
        lifecycle::advance(OrderStatus::Delivered, Actor::Seller),
        Err(TransitionError::NotAllowed {
            action: OrderAction::Advance,
            from: OrderStatus::Delivered
        })
    );
    assert_eq!(
        lifecycle::confirm_receipt(OrderStatus::Delivered, Actor::Buyer),
        Ok(OrderStatus::Received)
    );
    assert!(lifecycle::confirm_receipt(OrderStatus::Delivered, Actor::Seller).is_err());
    assert!(lifecycle::confirm_receipt(OrderStatus::Shipping, Actor::Buyer).is_err());
}

#[test]
fn either_party_cancels_open_orders() {
    for status in OrderStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
        for actor in [Actor::Buyer, Actor::Seller] {
            assert_eq!(
                lifecycle::cancel(status, actor),
                Ok(OrderStatus::Cancelled),
                "{actor} cancels {status}"
            );
        }
    }
}

#[test]
fn terminal_states_reject_everything() {
    for status in [OrderStatus::Received, OrderStatus::Cancelled] {
        for action in [OrderAction::Advance, OrderAction::ConfirmReceipt, OrderAction::Cancel] {
            for actor in [Actor::Buyer, Actor::Seller] {
                assert_eq!(
                    lifecycle::apply(status, action, actor),
                    Err(TransitionError::Terminal(status))
                );
            }
        }
        assert!(lifecycle::available_actions(status, Actor::Buyer).is_empty());
        assert!(lifecycle::available_actions(status, Actor::Seller).is_empty());
    }
}

#[test]
fn full_delivery_scenario() {
    let mut status = OrderStatus::Pending;
    status = lifecycle::advance(status, Actor::Seller).unwrap();
    assert_eq!(status, OrderStatus::Shipping);
    status = lifecycle::advance(status, Actor::Seller).unwrap();
    assert_eq!(status, OrderStatus::Delivered);
    status = lifecycle::confirm_receipt(status, Actor::Buyer).unwrap();
    assert_eq!(status, OrderStatus::Received);
    assert!(status.is_terminal());
}

#[test]
fn cancelled_order_stays_cancelled() {
    let status = lifecycle::cancel(OrderStatus::Pending, Actor::Buyer).unwrap();
    assert_eq!(status, OrderStatus::Cancelled);
    assert_eq!(
        lifecycle::advance(status, Actor::Seller),
        Err(TransitionError::Terminal(OrderStatus::Cancelled))
    );
}

#[test]
fn available_actions_per_side() {
    assert_eq!(
        lifecycle::available_actions(OrderStatus::Pending, Actor::Seller),
        vec![OrderAction::Advance, OrderAction::Cancel]
    );
    assert_eq!(
        lifecycle::available_actions(OrderStatus::Pending, Actor::Buyer),
        vec![OrderAction::Cancel]
    );
    assert_eq!(
        lifecycle::available_actions(OrderStatus::Delivered, Actor::Buyer),
        vec![OrderAction::ConfirmReceipt, OrderAction::Cancel]
    );
    assert_eq!(
        lifecycle::available_actions(OrderStatus::Delivered, Actor::Seller),
        vec![OrderAction::Cancel]
    );
}

#[test]
fn status_strings_round_trip() {
    for status in OrderStatus::ALL {
        assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
    }
    assert!("refunded".parse::<OrderStatus>().is_err());
    assert!("Pending".parse::<OrderStatus>().is_err());
}

#[test]
fn labels_are_vietnamese() {
    assert_eq!(OrderStatus::Pending.label(), "Chờ xác nhận");
    assert_eq!(OrderStatus::Shipping.label(), "Đang giao hàng");
    assert_eq!(OrderStatus::Received.label(), "Đã nhận hàng");
    assert_eq!(OrderStatus::Cancelled.label(), "Đã hủy");
    assert_eq!(lifecycle::status_label("delivered"), "Đã giao hàng");
}

#[test]
fn timeline_marks_progress() {
    let view = lifecycle::timeline("shipping");
    assert_eq!(view.steps.len(), TIMELINE_STEPS.len());
    assert!(!view.cancelled);
    let completed: Vec<bool> = view.steps.iter().map(|s| s.completed).collect();
    assert_eq!(completed, vec![true, true, true, true, false, false]);
    let current: Vec<OrderStatus> = view.steps.iter().filter(|s| s.current).map(|s| s.key).collect();
    assert_eq!(current, vec![OrderStatus::Shipping]);
    assert_eq!(view.label, "Đang giao hàng");
}

#[test]
fn timeline_branches_on_cancel() {
    let view = lifecycle::timeline("cancelled");
    assert!(view.cancelled);
    assert!(view.steps.iter().all(|s| !s.completed && !s.current));
    assert!(!view.steps.iter().any(|s| s.key == OrderStatus::Cancelled));
}

#[test]
fn unknown_status_degrades_to_raw_label() {
    let view = lifecycle::timeline("on_hold");
    assert_eq!(view.label, "on_hold");
    assert_eq!(view.status, "on_hold");
    assert!(!view.cancelled);
    assert!(view.steps.iter().all(|s| !s.completed));
}

#[test]
fn seller_prompt_copy() {
    let pending = lifecycle::seller_prompt(OrderStatus::Pending);
    assert!(pending.enabled);
    assert_eq!(pending.next, Some(OrderStatus::Shipping));
    assert_eq!(pending.button_label, "Xác nhận");
    assert_eq!(pending.confirm_text, "Xác nhận");
    assert_eq!(pending.cancel_text, "Hủy");

    let delivered = lifecycle::seller_prompt(OrderStatus::Delivered);
    assert!(!delivered.enabled);
    assert_eq!(delivered.next, None);
    assert_eq!(delivered.button_label, "Đang chờ khách hàng xác nhận");
}
