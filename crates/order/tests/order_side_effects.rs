mod common;

use common::{Harness, dine_in, line, seed_menu, takeaway};
use order::{
    abstract_trait::order::service::OrderCommandServiceTrait,
    domain::requests::{order::UpdateOrderRequest, reference::EntityRef},
    model::{order::OrderStatus, order_token::TokenStatus, table::TableStatus},
    service::counters::SideEffect,
};
use rust_decimal::dec;
use std::sync::atomic::Ordering;

fn complete(id: i32) -> UpdateOrderRequest {
    let mut req = UpdateOrderRequest::new(id);
    req.status = Some(OrderStatus::Completed);
    req
}

#[tokio::test]
async fn broken_token_and_loyalty_stores_do_not_fail_completion() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    let customer = h.store.seed_customer("Dewi", 10);

    let mut req = dine_in(
        &[menu.t1],
        vec![
            line(menu.lemonade, 2, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
        ],
    );
    req.customer = Some(EntityRef::Id(customer));
    let order = h.command.create_order(&req).await.unwrap().data;

    h.store.fail_token_status.store(true, Ordering::SeqCst);
    h.store.fail_loyalty.store(true, Ordering::SeqCst);

    let completed = h.command.update_order(&complete(order.id)).await.unwrap().data;

    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(
        h.store.order_row(order.id).map(|o| o.status),
        Some(OrderStatus::Completed)
    );
    assert_eq!(h.store.table_status(menu.t1), TableStatus::Available);
    assert!(
        h.store
            .tokens_of(order.id)
            .iter()
            .all(|t| t.status == TokenStatus::Pending)
    );
    assert_eq!(h.store.customer_points(customer), 10);
    assert_eq!(h.counters.failures_of(SideEffect::TokenDelivery), 2);
    assert_eq!(h.counters.failures_of(SideEffect::LoyaltyAward), 1);
    assert_eq!(h.counters.failures_of(SideEffect::LoyaltyRedeem), 0);
}

#[tokio::test]
async fn broken_table_store_does_not_fail_creation() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    h.store.fail_table_status.store(true, Ordering::SeqCst);

    let order = h
        .command
        .create_order(&dine_in(&[menu.t1], vec![line(menu.burger, 1, dec!(9.00))]))
        .await
        .unwrap()
        .data;

    assert!(h.store.order_row(order.id).is_some());
    assert_eq!(order.tables.len(), 1);
    assert_eq!(h.store.table_status(menu.t1), TableStatus::Available);
    assert_eq!(h.counters.failures_of(SideEffect::TableStatus), 1);
}

#[tokio::test]
async fn completion_redeems_then_awards_points() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    let customer = h.store.seed_customer("Budi", 50);

    let mut req = takeaway(vec![
        line(menu.lemonade, 2, dec!(4.50)),
        line(menu.burger, 1, dec!(9.00)),
    ]);
    req.customer = Some(EntityRef::Id(customer));
    let order = h.command.create_order(&req).await.unwrap().data;

    let mut done = complete(order.id);
    done.redeem_amount = Some(dec!(5.00));
    h.command.update_order(&done).await.unwrap();

    // 50 - 5 redeemed + 18 earned
    assert_eq!(h.store.customer_points(customer), 63);
}

#[tokio::test]
async fn insufficient_balance_skips_redemption_but_still_awards() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    let customer = h.store.seed_customer("Sari", 2);

    let mut req = takeaway(vec![line(menu.burger, 1, dec!(9.00))]);
    req.customer = Some(EntityRef::Id(customer));
    let order = h.command.create_order(&req).await.unwrap().data;

    let mut done = complete(order.id);
    done.redeem_amount = Some(dec!(5.00));
    let completed = h.command.update_order(&done).await.unwrap().data;

    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(h.store.customer_points(customer), 11);
    assert_eq!(h.counters.failures_of(SideEffect::LoyaltyRedeem), 1);
    assert_eq!(h.counters.failures_of(SideEffect::LoyaltyAward), 0);
}

#[tokio::test]
async fn orders_without_a_customer_skip_loyalty() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    let bystander = h.store.seed_customer("Unrelated", 4);

    let order = h
        .command
        .create_order(&takeaway(vec![line(menu.burger, 1, dec!(9.00))]))
        .await
        .unwrap()
        .data;

    let completed = h.command.update_order(&complete(order.id)).await.unwrap().data;

    assert!(completed.customer.is_none());
    assert_eq!(h.store.customer_points(bystander), 4);
}
