pub mod grid;
pub mod twap;

pub use grid::{classify_level, grid_prices, GridLedger, GridLevel, GridPlan, LevelTag};
pub use twap::{TwapPlan, TwapSlice, TwapSummary};
