// src/live_trading/market.rs
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::cli::{rule, section};
use crate::context::TradingContext;
use crate::service::{ServiceResult, Simulation, DRY_RUN_ORDER_ID};
use trading_common::data::{OrderRecord, OrderRequest};

/// Validate, confirm, send a MARKET order, then re-read its status
pub async fn place_market_order(
    ctx: &TradingContext,
    symbol: &str,
    side: &str,
    quantity: Decimal,
) -> ServiceResult<OrderRecord> {
    let order = ctx.validator.validate_market_order(symbol, side, quantity).await?;
    let price = ctx.validator.current_price(&order.symbol).await?;

    section("MARKET ORDER SUMMARY");
    println!("Symbol:           {}", order.symbol);
    println!("Side:             {}", order.side);
    println!("Quantity:         {}", order.quantity);
    println!("Current Price:    ${}", price.round_dp(2));
    println!("Estimated Value:  ${} USDT", (order.quantity * price).round_dp(2));
    println!("Mode:             {}", ctx.submitter.mode_label());
    rule();

    ctx.submitter.confirm("Confirm market order? (yes/no): ")?;

    let request = OrderRequest::market(&order.symbol, order.side, order.quantity);
    let placed = ctx
        .submitter
        .submit_with(&request, Simulation::new(DRY_RUN_ORDER_ID).fill_price(price))
        .await?;

    let record = if placed.simulated {
        placed
    } else {
        match ctx.api.get_order(&placed.symbol, placed.order_id).await {
            Ok(current) => current,
            Err(e) => {
                warn!(order_id = placed.order_id, error = %e, "could not refresh order status");
                placed
            }
        }
    };

    info!(
        order_id = record.order_id,
        status = %record.status,
        executed_qty = %record.executed_qty,
        avg_price = %record.avg_price,
        "market order executed"
    );

    section("ORDER RESULT");
    println!("Order ID:         {}", record.order_id);
    println!("Status:           {}", record.status);
    println!("Executed Qty:     {}", record.executed_qty);
    if record.avg_price > Decimal::ZERO {
        println!("Avg Price:        ${}", record.avg_price.round_dp(2));
        println!("Total Value:      ${} USDT", record.filled_value().round_dp(2));
    }
    rule();

    Ok(record)
}
