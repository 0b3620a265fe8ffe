// trading-core/src/lib.rs
// Order toolkit for USDT-margined futures: exchange client, validation,
// submission and the order executors.

pub mod cli;
pub mod config;
pub mod context;
pub mod exchange;
pub mod live_trading;
pub mod logging;
pub mod service;

// Re-export trading-common for convenience
pub use trading_common::{data, strategy};
