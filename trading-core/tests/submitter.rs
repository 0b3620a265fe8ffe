mod common;

use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{context, context_with, FakeExchange, ScriptedConfirm};
use trading_common::data::{OrderRequest, OrderStatus, Side, TimeInForce};
use trading_core::exchange::ExchangeError;
use trading_core::live_trading::market::place_market_order;
use trading_core::service::{ServiceError, DRY_RUN_ORDER_ID};

#[tokio::test]
async fn test_dry_run_never_reaches_exchange() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), true);

    let record = place_market_order(&ctx, "BTCUSDT", "BUY", dec!(0.01)).await.unwrap();
    assert_eq!(record.order_id, DRY_RUN_ORDER_ID);
    assert_eq!(record.status, OrderStatus::Filled);
    assert_eq!(record.avg_price, dec!(50000));
    assert!(record.simulated);

    let request = OrderRequest::limit("BTCUSDT", Side::Sell, dec!(0.01), dec!(60000), TimeInForce::Gtc);
    let record = ctx.submitter.submit(&request).await.unwrap();
    assert_eq!(record.status, OrderStatus::New);

    assert_eq!(api.place_calls(), 0);
}

#[tokio::test]
async fn test_dry_run_skips_prompt() {
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let ctx = context_with(Arc::new(FakeExchange::new()), confirmer.clone(), true);

    ctx.submitter.confirm("Confirm? (yes/no): ").unwrap();
    assert_eq!(confirmer.asked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_declined_confirmation_aborts() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context_with(api.clone(), Arc::new(ScriptedConfirm::new(&[false])), false);

    let err = place_market_order(&ctx, "BTCUSDT", "SELL", dec!(0.01)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Aborted(_)));
    assert_eq!(api.place_calls(), 0);
}

#[tokio::test]
async fn test_live_submission_forwards_request() {
    let api = Arc::new(FakeExchange::new());
    let ctx = context(api.clone(), false);

    let request = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.01), dec!(49000), TimeInForce::Gtc);
    let record = ctx.submitter.submit(&request).await.unwrap();

    assert!(!record.simulated);
    assert_eq!(api.placed(), vec![request]);
}

#[tokio::test]
async fn test_exchange_rejection_propagates() {
    let api = Arc::new(FakeExchange::new());
    api.reject_orders(true);
    let ctx = context(api.clone(), false);

    let request = OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.01));
    let err = ctx.submitter.submit(&request).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Exchange(ExchangeError::ApiError { code: -2019, .. })
    ));
    assert!(!err.is_validation());
}
