// src/bin/twap.rs
// Usage: twap BTCUSDT BUY 0.1 --duration 60 --intervals 10 [--limit-price 50000]

use anyhow::{bail, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::process::ExitCode;
use std::time::Duration;

use trading_core::cli::{bootstrap, exit_code, shutdown_channel, CommonArgs};
use trading_core::live_trading::{TwapExecutor, TwapRequest};

#[derive(Parser)]
#[command(name = "twap")]
#[command(about = "Split a large order into equal slices executed over time")]
struct Args {
    symbol: String,
    side: String,

    /// Total quantity across all slices
    quantity: Decimal,

    /// Total duration in minutes
    #[arg(long, default_value_t = 60)]
    duration: u64,

    /// Number of slices
    #[arg(long, default_value_t = 10)]
    intervals: u32,

    /// Send slices as LIMIT IOC at this price instead of MARKET
    #[arg(long)]
    limit_price: Option<Decimal>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    if args.duration == 0 {
        bail!("Duration must be at least 1 minute");
    }
    if args.intervals == 0 {
        bail!("Number of intervals must be at least 1");
    }

    let session = bootstrap("twap", &args.common)?;

    let request = TwapRequest {
        symbol: args.symbol,
        side: args.side,
        total_quantity: args.quantity,
        duration: Duration::from_secs(args.duration * 60),
        num_slices: args.intervals,
        limit_price: args.limit_price,
    };

    let executor = TwapExecutor::new(&session.ctx);
    let prepared = executor.prepare(&request).await?;

    // Ctrl-C keeps its default behaviour until the operator has said yes
    let shutdown = shutdown_channel();
    executor.run(prepared, shutdown.subscribe()).await?;
    Ok(())
}
