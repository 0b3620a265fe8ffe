// src/bin/grid.rs
// Usage: grid BTCUSDT 48000 52000 --grids 10 --quantity 0.001 [--monitor] [--interval 5]

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use std::process::ExitCode;
use std::time::Duration;

use trading_core::cli::{bootstrap, exit_code, shutdown_channel, CommonArgs};
use trading_core::live_trading::{GridConfig, GridTrader};

#[derive(Parser)]
#[command(name = "grid")]
#[command(about = "Lay a ladder of buy and sell limits across a price range")]
struct Args {
    symbol: String,

    /// Bottom of the range
    lower_price: Decimal,

    /// Top of the range
    upper_price: Decimal,

    /// Number of intervals; the range gets one more level than this
    #[arg(long, default_value_t = 10)]
    grids: u32,

    /// Quantity per level
    #[arg(long)]
    quantity: Decimal,

    /// Keep running and replace filled levels
    #[arg(long)]
    monitor: bool,

    /// Seconds between fill checks
    #[arg(long, default_value_t = 5)]
    interval: u64,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    let session = bootstrap("grid", &args.common)?;

    let config = GridConfig {
        symbol: args.symbol,
        lower_price: args.lower_price,
        upper_price: args.upper_price,
        num_grids: args.grids,
        quantity_per_grid: args.quantity,
    };
    let mut trader = GridTrader::setup(&session.ctx, &config).await?;

    if !args.monitor {
        println!("\nGrid placed. Run again with --monitor to replace fills automatically.");
        return Ok(());
    }
    if session.ctx.is_dry_run() {
        println!("\nMonitoring is not available in dry-run mode");
        return Ok(());
    }

    let shutdown = shutdown_channel();
    let interval = Duration::from_secs(args.interval.max(1));
    trader.monitor(interval, shutdown.subscribe()).await?;
    Ok(())
}
