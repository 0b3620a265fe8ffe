// src/exchange/mod.rs

pub mod connector;
pub mod errors;
pub mod filters;
pub mod signer;
pub mod traits;
pub mod types;
pub mod utils;

pub use connector::BinanceFuturesConnector as ExchangeConnector;
pub use errors::ExchangeError;
pub use filters::FilterCache;
pub use signer::RequestSigner;
pub use traits::FuturesApi;
pub use types::*;
