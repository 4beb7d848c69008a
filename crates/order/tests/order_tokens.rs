mod common;

use chrono::Duration;
use common::{Harness, existing_line, line, seed_menu, takeaway};
use order::{
    abstract_trait::order::service::OrderCommandServiceTrait,
    domain::requests::order::UpdateOrderRequest,
    model::{
        order::OrderStatus,
        order_token::{StationType, TokenStatus},
    },
};
use rust_decimal::dec;

#[tokio::test]
async fn bar_only_orders_get_a_single_bar_token() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 1, dec!(4.50)),
            line(menu.lemonade, 3, dec!(4.50)),
        ]))
        .await
        .unwrap()
        .data;

    assert_eq!(order.tokens.len(), 1);
    assert_eq!(order.tokens[0].station_type, StationType::Bar);
    assert_eq!(order.tokens[0].order_item_ids.len(), 2);
}

#[tokio::test]
async fn unrouted_items_get_no_token() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.napkins, 1, dec!(0.50)),
            line(menu.burger, 1, dec!(9.00)),
        ]))
        .await
        .unwrap()
        .data;

    assert_eq!(order.tokens.len(), 1);
    assert_eq!(order.tokens[0].station_type, StationType::Kitchen);
    assert_eq!(order.tokens[0].order_item_ids, vec![order.items[1].id]);

    let only_napkins = h
        .command
        .create_order(&takeaway(vec![line(menu.napkins, 2, dec!(0.50))]))
        .await
        .unwrap()
        .data;
    assert!(only_napkins.tokens.is_empty());
}

#[tokio::test]
async fn resending_the_same_items_keeps_one_active_token_per_station() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 2, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
        ]))
        .await
        .unwrap()
        .data;

    let same_items = vec![
        existing_line(order.items[0].id, menu.lemonade, 2, dec!(4.50)),
        existing_line(order.items[1].id, menu.burger, 1, dec!(9.00)),
    ];

    for round in 1..=2 {
        h.tick(Duration::milliseconds(7));

        let mut update = UpdateOrderRequest::new(order.id);
        update.items = Some(same_items.clone());
        h.command.update_order(&update).await.unwrap();

        let active = h.store.active_tokens_of(order.id);
        assert_eq!(active.len(), 2, "round {round}");
        assert_eq!(
            active
                .iter()
                .filter(|t| t.station_type == StationType::Bar)
                .count(),
            1
        );
        assert_eq!(
            active
                .iter()
                .filter(|t| t.station_type == StationType::Kitchen)
                .count(),
            1
        );
    }

    let history = h.store.tokens_of(order.id);
    assert_eq!(history.len(), 6);
    assert_eq!(
        history
            .iter()
            .filter(|t| t.status == TokenStatus::Cancelled)
            .count(),
        4
    );
    assert_eq!(h.store.items_of(order.id).len(), 2);
}

#[tokio::test]
async fn dropping_the_last_kitchen_item_retires_its_token() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 2, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
        ]))
        .await
        .unwrap()
        .data;

    h.tick(Duration::milliseconds(3));

    let mut update = UpdateOrderRequest::new(order.id);
    update.items = Some(vec![existing_line(
        order.items[0].id,
        menu.lemonade,
        2,
        dec!(4.50),
    )]);
    let updated = h.command.update_order(&update).await.unwrap().data;

    assert_eq!(updated.subtotal, dec!(9.00));
    assert_eq!(updated.items.len(), 1);

    let active = h.store.active_tokens_of(order.id);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].station_type, StationType::Bar);
    assert!(h.store.items_of(order.id).iter().all(|i| i.item_id == menu.lemonade));
}

#[tokio::test]
async fn cancelling_retires_pending_tokens() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 1, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
        ]))
        .await
        .unwrap()
        .data;

    let mut cancel = UpdateOrderRequest::new(order.id);
    cancel.status = Some(OrderStatus::Cancelled);
    let cancelled = h.command.update_order(&cancel).await.unwrap().data;

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(h.store.active_tokens_of(order.id).is_empty());
    assert!(
        cancelled
            .tokens
            .iter()
            .all(|t| t.status == TokenStatus::Cancelled)
    );
}

#[tokio::test]
async fn regenerate_replaces_active_tokens() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 1, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
        ]))
        .await
        .unwrap()
        .data;
    let original: Vec<i32> = order.tokens.iter().map(|t| t.id).collect();

    h.tick(Duration::milliseconds(11));
    let issued = h.command.regenerate_tokens(order.id).await.unwrap().data;

    assert_eq!(issued.len(), 2);
    assert!(issued.iter().all(|t| t.status == TokenStatus::Pending));
    assert!(issued.iter().all(|t| !original.contains(&t.id)));
    assert_eq!(issued[0].station_type, StationType::Bar);
    assert_eq!(issued[0].order_item_ids, vec![order.items[0].id]);
    assert_eq!(issued[1].order_item_ids, vec![order.items[1].id]);

    let active = h.store.active_tokens_of(order.id);
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|t| !original.contains(&t.id)));
}

#[tokio::test]
async fn token_codes_embed_station_and_date() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    h.tick(Duration::milliseconds(42));
    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 1, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
        ]))
        .await
        .unwrap()
        .data;

    let codes: Vec<&str> = order.tokens.iter().map(|t| t.token_code.as_str()).collect();
    assert_eq!(codes, vec!["B-20250307-042", "K-20250307-042"]);
}

#[tokio::test]
async fn colliding_code_falls_back_to_the_microsecond_suffix() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    h.tick(Duration::milliseconds(42));

    let mut codes = Vec::new();
    for _ in 0..2 {
        let order = h
            .command
            .create_order(&takeaway(vec![line(menu.lemonade, 1, dec!(4.50))]))
            .await
            .unwrap()
            .data;
        codes.push(order.tokens[0].token_code.clone());
    }

    // 42ms is 42000us, so the finer suffix wraps to 000
    assert_eq!(codes, vec!["B-20250307-042", "B-20250307-000"]);
}

#[tokio::test]
async fn code_is_issued_even_when_the_fallback_collides() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);
    h.tick(Duration::milliseconds(42));

    let mut orders = Vec::new();
    for _ in 0..3 {
        let order = h
            .command
            .create_order(&takeaway(vec![line(menu.lemonade, 1, dec!(4.50))]))
            .await
            .unwrap()
            .data;
        orders.push(order);
    }

    let third = &orders[2];
    assert_eq!(third.tokens.len(), 1);
    assert_eq!(third.tokens[0].token_code, "B-20250307-000");
    assert_eq!(h.store.active_tokens_of(third.id).len(), 1);
    assert_eq!(
        h.store
            .db()
            .tokens
            .values()
            .filter(|t| t.token_code == "B-20250307-000")
            .count(),
        2
    );
}

#[tokio::test]
async fn issued_tokens_are_counted_per_station() {
    let h = Harness::new();
    let menu = seed_menu(&h.store);

    let order = h
        .command
        .create_order(&takeaway(vec![
            line(menu.lemonade, 1, dec!(4.50)),
            line(menu.burger, 1, dec!(9.00)),
            line(menu.napkins, 1, dec!(0.50)),
        ]))
        .await
        .unwrap()
        .data;

    assert_eq!(h.counters.issued_for(StationType::Bar), 1);
    assert_eq!(h.counters.issued_for(StationType::Kitchen), 1);

    h.tick(Duration::milliseconds(5));
    h.command.regenerate_tokens(order.id).await.unwrap();

    let mut update = UpdateOrderRequest::new(order.id);
    update.items = Some(vec![existing_line(
        order.items[1].id,
        menu.burger,
        1,
        dec!(9.00),
    )]);
    h.tick(Duration::milliseconds(5));
    h.command.update_order(&update).await.unwrap();

    assert_eq!(h.counters.issued_for(StationType::Bar), 2);
    assert_eq!(h.counters.issued_for(StationType::Kitchen), 3);
}
