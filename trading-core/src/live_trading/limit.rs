// src/live_trading/limit.rs
// Limit orders plus the order management helpers that go with them

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::cli::{rule, section};
use crate::context::TradingContext;
use crate::service::{ServiceError, ServiceResult};
use trading_common::data::{OrderRecord, OrderRequest, Side, TimeInForce};

/// Limit prices this far through the market (5%) get a warning
const AGGRESSIVE_LIMIT_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Signed distance from the market in percent
pub fn distance_from_market_pct(price: Decimal, market: Decimal) -> Decimal {
    if market.is_zero() {
        return Decimal::ZERO;
    }
    (price - market) / market * Decimal::from(100)
}

/// BUY far above or SELL far below the market will most likely fill at once
pub fn aggressive_price_warning(side: Side, price: Decimal, market: Decimal) -> Option<String> {
    let distance = distance_from_market_pct(price, market);
    match side {
        Side::Buy if distance > AGGRESSIVE_LIMIT_PCT => Some(format!(
            "BUY limit price is {}% above market price and will likely fill immediately",
            distance.round_dp(2)
        )),
        Side::Sell if distance < -AGGRESSIVE_LIMIT_PCT => Some(format!(
            "SELL limit price is {}% below market price and will likely fill immediately",
            distance.abs().round_dp(2)
        )),
        _ => None,
    }
}

pub async fn place_limit_order(
    ctx: &TradingContext,
    symbol: &str,
    side: &str,
    quantity: Decimal,
    price: Decimal,
    time_in_force: TimeInForce,
) -> ServiceResult<OrderRecord> {
    let order = ctx
        .validator
        .validate_limit_order(symbol, side, quantity, price)
        .await?;
    let limit_price = order.price.unwrap_or(price);
    let market = ctx.validator.current_price(&order.symbol).await?;

    section("LIMIT ORDER SUMMARY");
    println!("Symbol:           {}", order.symbol);
    println!("Side:             {}", order.side);
    println!("Quantity:         {}", order.quantity);
    println!("Limit Price:      ${}", limit_price);
    println!("Current Price:    ${}", market.round_dp(2));
    println!(
        "Distance:         {}%",
        distance_from_market_pct(limit_price, market).round_dp(2)
    );
    println!("Order Value:      ${} USDT", (order.quantity * limit_price).round_dp(2));
    println!("Time in Force:    {}", time_in_force);
    println!("Mode:             {}", ctx.submitter.mode_label());
    rule();

    if let Some(warning) = aggressive_price_warning(order.side, limit_price, market) {
        warn!(symbol = %order.symbol, %limit_price, %market, "{}", warning);
        println!("\n⚠️  Warning: {}", warning);
    }

    ctx.submitter.confirm("Confirm limit order? (yes/no): ")?;

    let request = OrderRequest::limit(
        &order.symbol,
        order.side,
        order.quantity,
        limit_price,
        time_in_force,
    );
    let record = ctx.submitter.submit(&request).await?;

    println!("\n✅ Limit order placed: ID {} ({})", record.order_id, record.status);
    Ok(record)
}

fn require_live(ctx: &TradingContext, action: &str) -> ServiceResult<()> {
    if ctx.is_dry_run() {
        return Err(ServiceError::Config(format!(
            "{} is not available in dry-run mode",
            action
        )));
    }
    Ok(())
}

pub async fn cancel_order(
    ctx: &TradingContext,
    symbol: &str,
    order_id: i64,
) -> ServiceResult<OrderRecord> {
    require_live(ctx, "Cancelling orders")?;
    let symbol = ctx.validator.validate_symbol(symbol).await?;

    let record = ctx.api.cancel_order(&symbol, order_id).await?;
    info!(order_id, symbol = %symbol, status = %record.status, "order cancelled");
    Ok(record)
}

pub async fn open_orders(
    ctx: &TradingContext,
    symbol: Option<&str>,
) -> ServiceResult<Vec<OrderRecord>> {
    require_live(ctx, "Listing open orders")?;
    let symbol = match symbol {
        Some(s) => Some(ctx.validator.validate_symbol(s).await?),
        None => None,
    };

    let orders = ctx.api.open_orders(symbol.as_deref()).await?;
    info!(count = orders.len(), "open orders fetched");
    Ok(orders)
}

pub async fn check_order_status(
    ctx: &TradingContext,
    symbol: &str,
    order_id: i64,
) -> ServiceResult<OrderRecord> {
    require_live(ctx, "Order status lookups")?;
    let symbol = ctx.validator.validate_symbol(symbol).await?;
    Ok(ctx.api.get_order(&symbol, order_id).await?)
}

/// Cancel then re-place with new quantity and price.
/// Not atomic: if the new order is rejected the old one is already gone.
pub async fn modify_order(
    ctx: &TradingContext,
    symbol: &str,
    order_id: i64,
    quantity: Decimal,
    price: Decimal,
) -> ServiceResult<OrderRecord> {
    let existing = check_order_status(ctx, symbol, order_id).await?;
    let order = ctx
        .validator
        .validate_limit_order(&existing.symbol, existing.side.as_str(), quantity, price)
        .await?;

    ctx.submitter.confirm(&format!(
        "Replace order {} with {} {} @ {}? (yes/no): ",
        order_id,
        order.side,
        order.quantity,
        order.price.unwrap_or(price)
    ))?;

    cancel_order(ctx, &order.symbol, order_id).await?;

    let request = OrderRequest::limit(
        &order.symbol,
        order.side,
        order.quantity,
        order.price.unwrap_or(price),
        existing.time_in_force.unwrap_or(TimeInForce::Gtc),
    );
    let record = ctx.submitter.submit(&request).await?;
    info!(old_order_id = order_id, new_order_id = record.order_id, "order modified");
    Ok(record)
}

pub fn print_orders(orders: &[OrderRecord]) {
    if orders.is_empty() {
        println!("No open orders");
        return;
    }
    for order in orders {
        println!(
            "  #{:<12} {:<10} {:<4} {:<6} qty {:<12} price {:<12} {}",
            order.order_id,
            order.symbol,
            order.side,
            order.order_type,
            order.orig_qty,
            order.price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            order.status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_aggressive_price_warnings() {
        assert!(aggressive_price_warning(Side::Buy, dec!(53000), dec!(50000)).is_some());
        assert!(aggressive_price_warning(Side::Buy, dec!(52000), dec!(50000)).is_none());
        assert!(aggressive_price_warning(Side::Buy, dec!(40000), dec!(50000)).is_none());

        assert!(aggressive_price_warning(Side::Sell, dec!(47000), dec!(50000)).is_some());
        assert!(aggressive_price_warning(Side::Sell, dec!(48000), dec!(50000)).is_none());
        assert!(aggressive_price_warning(Side::Sell, dec!(60000), dec!(50000)).is_none());
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance_from_market_pct(dec!(51000), dec!(50000)), dec!(2));
        assert_eq!(distance_from_market_pct(dec!(49000), dec!(50000)), dec!(-2));
        assert_eq!(distance_from_market_pct(dec!(1), Decimal::ZERO), Decimal::ZERO);
    }
}
