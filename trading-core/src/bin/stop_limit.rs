// src/bin/stop_limit.rs
// Usage: stop_limit BTCUSDT SELL 0.01 48000 [47900] [--tif GTC]
// Without a limit price: SELL is a stop-loss, BUY a stop-buy, limit 0.1% through the trigger.

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use std::process::ExitCode;

use trading_common::data::{Side, TimeInForce};
use trading_core::cli::{bootstrap, exit_code, CommonArgs};
use trading_core::live_trading::stop_limit::{place_stop_buy, place_stop_limit, place_stop_loss};

#[derive(Parser)]
#[command(name = "stop_limit")]
#[command(about = "Place a stop-limit order: triggers at the stop price, then rests as a limit")]
struct Args {
    symbol: String,
    side: String,
    quantity: Decimal,

    /// Trigger price
    stop_price: Decimal,

    /// Limit price once triggered, derived from the stop when omitted
    limit_price: Option<Decimal>,

    /// Only used with an explicit limit price; derived orders are GTC
    #[arg(long, default_value = "GTC")]
    tif: TimeInForce,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    let session = bootstrap("stop-limit order", &args.common)?;
    let ctx = &session.ctx;

    match args.limit_price {
        Some(limit_price) => {
            place_stop_limit(
                ctx,
                &args.symbol,
                &args.side,
                args.quantity,
                args.stop_price,
                limit_price,
                args.tif,
            )
            .await?;
        }
        None => match args.side.parse::<Side>()? {
            Side::Sell => {
                place_stop_loss(ctx, &args.symbol, args.quantity, args.stop_price).await?;
            }
            Side::Buy => {
                place_stop_buy(ctx, &args.symbol, args.quantity, args.stop_price).await?;
            }
        },
    }
    Ok(())
}
