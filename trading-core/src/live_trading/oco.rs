// src/live_trading/oco.rs
// Take-profit + stop-loss pair. The two legs are independent orders: the
// exchange does not cancel one when the other fills, the operator must.

use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, warn};

use super::stop_limit::derive_limit_price;
use crate::cli::{rule, section};
use crate::context::TradingContext;
use crate::service::{ServiceResult, Simulation};
use trading_common::data::{OrderRecord, OrderRequest, Side, TimeInForce};

pub const TAKE_PROFIT_SENTINEL_ID: i64 = 9_999_998;
pub const STOP_LOSS_SENTINEL_ID: i64 = 9_999_999;

/// Pause between the two legs in live mode
const LEG_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct OcoParams {
    pub symbol: String,
    /// Side of both exit orders (SELL closes a long)
    pub side: String,
    pub quantity: Decimal,
    pub take_profit: Decimal,
    pub stop_price: Decimal,
    /// Derived from `stop_price` when absent
    pub stop_limit_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct OcoOrders {
    pub take_profit: OrderRecord,
    pub stop_loss: OrderRecord,
}

/// Reward over risk, measured from the current price. `None` when the stop
/// sits exactly at the market.
pub fn risk_reward_ratio(take_profit: Decimal, stop: Decimal, market: Decimal) -> Option<Decimal> {
    let reward = (take_profit - market).abs();
    let risk = (market - stop).abs();
    if risk.is_zero() {
        return None;
    }
    Some(reward / risk)
}

/// Legs on the wrong side of the market for the given exit side
pub fn leg_warnings(
    side: Side,
    take_profit: Decimal,
    stop: Decimal,
    market: Decimal,
) -> Vec<String> {
    let mut warnings = Vec::new();
    match side {
        Side::Sell => {
            if take_profit <= market {
                warnings.push(format!(
                    "Take-profit ({}) should be above current price ({})",
                    take_profit, market
                ));
            }
            if stop >= market {
                warnings.push(format!(
                    "Stop-loss ({}) should be below current price ({})",
                    stop, market
                ));
            }
        }
        Side::Buy => {
            if take_profit >= market {
                warnings.push(format!(
                    "Take-profit ({}) should be below current price ({})",
                    take_profit, market
                ));
            }
            if stop <= market {
                warnings.push(format!(
                    "Stop-loss ({}) should be above current price ({})",
                    stop, market
                ));
            }
        }
    }
    warnings
}

pub async fn place_oco(ctx: &TradingContext, params: &OcoParams) -> ServiceResult<OcoOrders> {
    let v = &ctx.validator;
    let symbol = v.validate_symbol(&params.symbol).await?;
    let side = v.validate_side(&params.side)?;
    let quantity = v.validate_quantity(&symbol, params.quantity).await?;
    let take_profit = v.validate_price(&symbol, params.take_profit).await?;
    let stop_price = v.validate_price(&symbol, params.stop_price).await?;
    let stop_limit = v
        .validate_price(
            &symbol,
            params
                .stop_limit_price
                .unwrap_or_else(|| derive_limit_price(side, stop_price)),
        )
        .await?;
    v.validate_notional(&symbol, quantity, take_profit).await?;
    v.validate_notional(&symbol, quantity, stop_limit).await?;

    let market = v.current_price(&symbol).await?;
    for warning in leg_warnings(side, take_profit, stop_price, market) {
        warn!(symbol = %symbol, "{}", warning);
        println!("\n⚠️  Warning: {}", warning);
    }

    let reward = (take_profit - market).abs() * quantity;
    let risk = (market - stop_price).abs() * quantity;
    let ratio = risk_reward_ratio(take_profit, stop_price, market);

    section("OCO ORDER SUMMARY");
    println!("Symbol:               {}", symbol);
    println!("Side:                 {}", side);
    println!("Quantity:             {}", quantity);
    println!("Current Price:        ${}", market.round_dp(2));
    println!("\nTake-Profit (LIMIT):  ${}", take_profit);
    println!("Stop-Loss Trigger:    ${}", stop_price);
    println!("Stop-Loss Limit:      ${}", stop_limit);
    println!("\nPotential Profit:     ${} USDT", reward.round_dp(2));
    println!("Potential Loss:       ${} USDT", risk.round_dp(2));
    match ratio {
        Some(r) => println!("Risk/Reward Ratio:    1:{}", r.round_dp(2)),
        None => println!("Risk/Reward Ratio:    n/a"),
    }
    println!("Mode:                 {}", ctx.submitter.mode_label());
    rule();

    if let Some(r) = ratio {
        if r < Decimal::ONE {
            warn!(symbol = %symbol, ratio = %r, "risk/reward ratio below 1:1");
            println!("\n⚠️  WARNING: Risk/Reward ratio is below 1:1");
        }
    }

    ctx.submitter.confirm("Confirm OCO order placement? (yes/no): ")?;

    let tp_request =
        OrderRequest::limit(&symbol, side, quantity, take_profit, TimeInForce::Gtc).reduce_only();
    let sl_request =
        OrderRequest::stop_limit(&symbol, side, quantity, stop_price, stop_limit, TimeInForce::Gtc)
            .reduce_only();

    info!(symbol = %symbol, side = %side, %quantity, %take_profit, "placing take-profit leg");
    let take_profit_order = ctx
        .submitter
        .submit_with(&tp_request, Simulation::new(TAKE_PROFIT_SENTINEL_ID))
        .await?;

    if !ctx.is_dry_run() {
        tokio::time::sleep(LEG_DELAY).await;
    }

    info!(
        symbol = %symbol,
        side = %side,
        %quantity,
        %stop_price,
        %stop_limit,
        "placing stop-loss leg"
    );
    let stop_loss_order = match ctx
        .submitter
        .submit_with(&sl_request, Simulation::new(STOP_LOSS_SENTINEL_ID))
        .await
    {
        Ok(order) => order,
        Err(e) => {
            warn!(
                take_profit_id = take_profit_order.order_id,
                "stop-loss leg failed, take-profit leg is still resting"
            );
            return Err(e);
        }
    };

    println!("\n✅ OCO orders placed");
    println!("  Take-Profit ID:   {}", take_profit_order.order_id);
    println!("  Stop-Loss ID:     {}", stop_loss_order.order_id);
    println!("\n⚠️  These orders are not linked. When one fills, cancel the other manually.");

    Ok(OcoOrders {
        take_profit: take_profit_order,
        stop_loss: stop_loss_order,
    })
}
