pub mod filters;
pub mod types;

pub use filters::{round_down_to_step, SafetyLimits, SymbolFilters};
pub use types::*;
