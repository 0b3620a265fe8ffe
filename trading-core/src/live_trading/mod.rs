// src/live_trading/mod.rs

pub mod grid;
pub mod limit;
pub mod market;
pub mod oco;
pub mod stop_limit;
pub mod twap;

pub use grid::{GridConfig, GridStats, GridTrader};
pub use oco::{OcoOrders, OcoParams};
pub use twap::{PreparedTwap, TwapCompletion, TwapExecutor, TwapReport, TwapRequest};
