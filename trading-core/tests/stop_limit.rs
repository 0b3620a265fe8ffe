mod common;

use rust_decimal_macros::dec;
use std::sync::Arc;

use common::{context, FakeExchange};
use trading_common::data::{OrderType, Side, TimeInForce};
use trading_core::live_trading::stop_limit::{place_stop_buy, place_stop_limit, place_stop_loss};
use trading_core::service::DRY_RUN_ORDER_ID;

#[tokio::test]
async fn test_stop_loss_derives_limit_below_trigger() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), true);

    let record = place_stop_loss(&ctx, "BTCUSDT", dec!(0.01), dec!(48000)).await.unwrap();

    assert_eq!(record.order_id, DRY_RUN_ORDER_ID);
    assert_eq!(record.order_type, OrderType::Stop);
    assert_eq!(record.side, Side::Sell);
    assert_eq!(record.stop_price, Some(dec!(48000)));
    assert_eq!(record.price, Some(dec!(47952)));
    assert_eq!(api.place_calls(), 0);
}

#[tokio::test]
async fn test_stop_buy_derives_limit_above_trigger() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), false);

    place_stop_buy(&ctx, "BTCUSDT", dec!(0.01), dec!(52000)).await.unwrap();

    let placed = api.placed();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].side, Side::Buy);
    assert_eq!(placed[0].stop_price, Some(dec!(52000)));
    assert_eq!(placed[0].price, Some(dec!(52052)));
    assert_eq!(placed[0].time_in_force, Some(TimeInForce::Gtc));
}

#[tokio::test]
async fn test_explicit_limit_keeps_time_in_force() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), false);

    place_stop_limit(
        &ctx,
        "BTCUSDT",
        "SELL",
        dec!(0.01),
        dec!(48000),
        dec!(47900.04),
        TimeInForce::Ioc,
    )
    .await
    .unwrap();

    let placed = api.placed();
    assert_eq!(placed[0].price, Some(dec!(47900.0)));
    assert_eq!(placed[0].time_in_force, Some(TimeInForce::Ioc));
    assert!(!placed[0].reduce_only);
}
