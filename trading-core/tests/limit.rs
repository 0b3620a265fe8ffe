mod common;

use rust_decimal_macros::dec;
use std::sync::Arc;

use common::{context, FakeExchange};
use trading_common::data::{OrderStatus, TimeInForce};
use trading_core::live_trading::limit::{
    cancel_order, check_order_status, modify_order, open_orders, place_limit_order,
};
use trading_core::service::ServiceError;

#[tokio::test]
async fn test_management_helpers_refuse_dry_run() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), true);

    let err = cancel_order(&ctx, "BTCUSDT", 1000).await.unwrap_err();
    assert!(matches!(err, ServiceError::Config(_)));
    let err = open_orders(&ctx, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Config(_)));
    let err = check_order_status(&ctx, "BTCUSDT", 1000).await.unwrap_err();
    assert!(matches!(err, ServiceError::Config(_)));
    let err = modify_order(&ctx, "BTCUSDT", 1000, dec!(0.01), dec!(48000))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Config(_)));

    assert_eq!(api.place_calls(), 0);
}

#[tokio::test]
async fn test_place_list_status_cancel() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), false);

    let placed =
        place_limit_order(&ctx, "BTCUSDT", "BUY", dec!(0.01), dec!(49000), TimeInForce::Gtc)
            .await
            .unwrap();
    assert_eq!(placed.status, OrderStatus::New);

    let open = open_orders(&ctx, Some("btcusdt")).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].order_id, placed.order_id);

    let status = check_order_status(&ctx, "BTCUSDT", placed.order_id).await.unwrap();
    assert_eq!(status.price, Some(dec!(49000)));

    let cancelled = cancel_order(&ctx, "BTCUSDT", placed.order_id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Canceled);
    assert!(open_orders(&ctx, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_modify_replaces_order_and_keeps_time_in_force() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), false);

    let original =
        place_limit_order(&ctx, "BTCUSDT", "SELL", dec!(0.01), dec!(51000), TimeInForce::Fok)
            .await
            .unwrap();
    let replaced = modify_order(&ctx, "BTCUSDT", original.order_id, dec!(0.02), dec!(51500.07))
        .await
        .unwrap();

    assert_ne!(replaced.order_id, original.order_id);
    assert_eq!(api.order(original.order_id).unwrap().status, OrderStatus::Canceled);

    let request = api.placed().last().cloned().unwrap();
    assert_eq!(request.quantity, dec!(0.02));
    assert_eq!(request.price, Some(dec!(51500.0)));
    assert_eq!(request.time_in_force, Some(TimeInForce::Fok));
}

#[tokio::test]
async fn test_rejected_replacement_leaves_original_cancelled() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), false);

    let original =
        place_limit_order(&ctx, "BTCUSDT", "BUY", dec!(0.01), dec!(49000), TimeInForce::Gtc)
            .await
            .unwrap();
    api.reject_orders(true);

    let err = modify_order(&ctx, "BTCUSDT", original.order_id, dec!(0.01), dec!(48500))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Exchange(_)));
    assert_eq!(api.order(original.order_id).unwrap().status, OrderStatus::Canceled);
    assert!(open_orders(&ctx, None).await.unwrap().is_empty());
}
