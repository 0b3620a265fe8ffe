// src/service/mod.rs

pub mod errors;
pub mod prompt;
pub mod submitter;
pub mod validator;

pub use errors::{ServiceError, ServiceResult};
pub use prompt::{AutoApprove, Confirm, StdinPrompt};
pub use submitter::{OrderSubmitter, Simulation, DRY_RUN_ORDER_ID};
pub use validator::OrderValidator;
