// File: src/exchange/filters.rs
// Process-lifetime cache of per-symbol trading rules

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::errors::ExchangeError;
use super::traits::FuturesApi;
use trading_common::data::{Instrument, SymbolFilters};

/// Instrument cache filled lazily from the exchange instrument list.
///
/// A miss fetches the whole list once and stores every entry, so the next
/// symbol is usually a hit as well. Symbols absent from a fresh list are
/// remembered as unknown and not fetched again. Entries are never invalidated.
pub struct FilterCache {
    api: Arc<dyn FuturesApi>,
    instruments: Arc<RwLock<HashMap<String, Instrument>>>,
    missing: Arc<RwLock<HashSet<String>>>,
}

impl FilterCache {
    pub fn new(api: Arc<dyn FuturesApi>) -> Self {
        Self {
            api,
            instruments: Arc::new(RwLock::new(HashMap::new())),
            missing: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn get_instrument(&self, symbol: &str) -> Result<Instrument, ExchangeError> {
        // Check cache first
        {
            let cache = self.instruments.read().await;
            if let Some(instrument) = cache.get(symbol) {
                return Ok(instrument.clone());
            }
        }
        if self.missing.read().await.contains(symbol) {
            return Err(ExchangeError::SymbolNotFound(symbol.to_string()));
        }

        debug!(symbol, "filter cache miss, fetching instrument list");
        let instruments = self.api.exchange_info().await?;

        let mut cache = self.instruments.write().await;
        for instrument in instruments {
            cache.insert(instrument.symbol.clone(), instrument);
        }
        info!(count = cache.len(), "exchange trading rules cached");

        match cache.get(symbol) {
            Some(instrument) => Ok(instrument.clone()),
            None => {
                debug!(symbol, "symbol not listed, remembering as unknown");
                self.missing.write().await.insert(symbol.to_string());
                Err(ExchangeError::SymbolNotFound(symbol.to_string()))
            }
        }
    }

    pub async fn get_filters(&self, symbol: &str) -> Result<SymbolFilters, ExchangeError> {
        Ok(self.get_instrument(symbol).await?.filters)
    }

    pub async fn cached_symbols(&self) -> usize {
        self.instruments.read().await.len()
    }
}
