// src/live_trading/stop_limit.rs
use rust_decimal::Decimal;
use tracing::warn;

use crate::cli::{rule, section};
use crate::context::TradingContext;
use crate::service::ServiceResult;
use trading_common::data::{OrderRecord, OrderRequest, Side, TimeInForce};

/// Offset between trigger and limit for derived stop-limit prices (0.1%)
pub const STOP_LIMIT_OFFSET: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Limit price slightly through the trigger so the order still fills in a fast market
pub fn derive_limit_price(side: Side, stop_price: Decimal) -> Decimal {
    match side {
        Side::Sell => stop_price * (Decimal::ONE - STOP_LIMIT_OFFSET),
        Side::Buy => stop_price * (Decimal::ONE + STOP_LIMIT_OFFSET),
    }
}

/// Placement problems worth telling the operator about
pub fn stop_limit_warnings(
    side: Side,
    stop: Decimal,
    limit: Decimal,
    market: Decimal,
) -> Vec<String> {
    let mut warnings = Vec::new();
    match side {
        Side::Sell => {
            if stop >= market {
                warnings.push(format!(
                    "SELL stop price ({}) is at or above current price ({}); \
                     the order may trigger immediately",
                    stop, market
                ));
            }
            if limit > stop {
                warnings.push(format!(
                    "Limit price ({}) is above stop price ({}); unusual for a SELL stop",
                    limit, stop
                ));
            }
        }
        Side::Buy => {
            if stop <= market {
                warnings.push(format!(
                    "BUY stop price ({}) is at or below current price ({}); \
                     the order may trigger immediately",
                    stop, market
                ));
            }
            if limit < stop {
                warnings.push(format!(
                    "Limit price ({}) is below stop price ({}); unusual for a BUY stop",
                    limit, stop
                ));
            }
        }
    }
    warnings
}

/// STOP order: rests until `stop_price` trades, then works at `limit_price`
pub async fn place_stop_limit(
    ctx: &TradingContext,
    symbol: &str,
    side: &str,
    quantity: Decimal,
    stop_price: Decimal,
    limit_price: Decimal,
    time_in_force: TimeInForce,
) -> ServiceResult<OrderRecord> {
    let v = &ctx.validator;
    let symbol = v.validate_symbol(symbol).await?;
    let side = v.validate_side(side)?;
    let quantity = v.validate_quantity(&symbol, quantity).await?;
    let stop_price = v.validate_price(&symbol, stop_price).await?;
    let limit_price = v.validate_price(&symbol, limit_price).await?;
    v.validate_notional(&symbol, quantity, limit_price).await?;

    let market = v.current_price(&symbol).await?;
    for warning in stop_limit_warnings(side, stop_price, limit_price, market) {
        warn!(symbol = %symbol, "{}", warning);
        println!("\n⚠️  Warning: {}", warning);
    }

    section("STOP-LIMIT ORDER SUMMARY");
    println!("Symbol:           {}", symbol);
    println!("Side:             {}", side);
    println!("Quantity:         {}", quantity);
    println!("Stop Price:       ${}", stop_price);
    println!("Limit Price:      ${}", limit_price);
    println!("Current Price:    ${}", market.round_dp(2));
    println!("Order Value:      ${} USDT", (quantity * limit_price).round_dp(2));
    println!("Mode:             {}", ctx.submitter.mode_label());
    rule();

    ctx.submitter.confirm("Confirm stop-limit order? (yes/no): ")?;

    let request =
        OrderRequest::stop_limit(&symbol, side, quantity, stop_price, limit_price, time_in_force);
    let record = ctx.submitter.submit(&request).await?;

    println!(
        "\n✅ Stop-limit order placed: ID {} (triggers at ${})",
        record.order_id, stop_price
    );
    Ok(record)
}

/// SELL stop below the market to protect a long position
pub async fn place_stop_loss(
    ctx: &TradingContext,
    symbol: &str,
    quantity: Decimal,
    stop_price: Decimal,
) -> ServiceResult<OrderRecord> {
    let limit = derive_limit_price(Side::Sell, stop_price);
    place_stop_limit(ctx, symbol, "SELL", quantity, stop_price, limit, TimeInForce::Gtc).await
}

/// BUY stop above the market, for breakouts or covering a short
pub async fn place_stop_buy(
    ctx: &TradingContext,
    symbol: &str,
    quantity: Decimal,
    stop_price: Decimal,
) -> ServiceResult<OrderRecord> {
    let limit = derive_limit_price(Side::Buy, stop_price);
    place_stop_limit(ctx, symbol, "BUY", quantity, stop_price, limit, TimeInForce::Gtc).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_derived_limit_offsets() {
        assert_eq!(derive_limit_price(Side::Sell, dec!(48000)), dec!(47952));
        assert_eq!(derive_limit_price(Side::Buy, dec!(52000)), dec!(52052));
    }

    #[test]
    fn test_sell_stop_warnings() {
        assert!(stop_limit_warnings(Side::Sell, dec!(48000), dec!(47900), dec!(50000)).is_empty());

        let warnings = stop_limit_warnings(Side::Sell, dec!(51000), dec!(51100), dec!(50000));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_buy_stop_warnings() {
        assert!(stop_limit_warnings(Side::Buy, dec!(52000), dec!(52100), dec!(50000)).is_empty());

        let warnings = stop_limit_warnings(Side::Buy, dec!(50000), dec!(52100), dec!(50000));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("trigger immediately"));
    }
}
