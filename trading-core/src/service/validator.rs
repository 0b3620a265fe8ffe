// service/validator.rs
// Order parameter checks against exchange rules and the operator's safety band

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::{ServiceError, ServiceResult};
use crate::exchange::utils::normalize_symbol;
use crate::exchange::{ExchangeError, FilterCache, FuturesApi};
use trading_common::data::{
    SafetyLimits, Side, SymbolFilters, ValidatedOrder, ValidationError,
};

/// Validates and rounds order parameters.
///
/// Quantities and prices are truncated to the symbol's step and tick size,
/// never rounded up. Failures come back as `ServiceError::Validation` unless
/// the exchange itself could not be reached.
pub struct OrderValidator {
    api: Arc<dyn FuturesApi>,
    filters: Arc<FilterCache>,
    limits: SafetyLimits,
    quote_asset: String,
}

impl OrderValidator {
    pub fn new(
        api: Arc<dyn FuturesApi>,
        filters: Arc<FilterCache>,
        limits: SafetyLimits,
        quote_asset: &str,
    ) -> Self {
        Self {
            api,
            filters,
            limits,
            quote_asset: quote_asset.to_uppercase(),
        }
    }

    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }

    /// Upper-cases the symbol and checks it is a listed, tradable pair in the quote asset
    pub async fn validate_symbol(&self, symbol: &str) -> ServiceResult<String> {
        let symbol = normalize_symbol(symbol);

        if symbol.len() <= self.quote_asset.len() || !symbol.ends_with(&self.quote_asset) {
            return Err(ValidationError::InvalidSymbolFormat {
                symbol,
                quote: self.quote_asset.clone(),
            }
            .into());
        }

        let instrument = self
            .filters
            .get_instrument(&symbol)
            .await
            .map_err(|e| symbol_error(e, &symbol))?;

        if !instrument.is_trading() {
            return Err(ValidationError::TradingDisabled {
                symbol,
                status: instrument.status,
            }
            .into());
        }

        debug!(symbol = %symbol, "symbol valid");
        Ok(symbol)
    }

    pub fn validate_side(&self, side: &str) -> ServiceResult<Side> {
        Ok(side.parse::<Side>()?)
    }

    pub async fn validate_quantity(&self, symbol: &str, quantity: Decimal) -> ServiceResult<Decimal> {
        let filters = self.symbol_filters(symbol).await?;
        let rounded = filters.check_quantity(quantity)?;
        if rounded != quantity {
            debug!(symbol, %quantity, %rounded, step = %filters.step_size, "quantity rounded down");
        }
        Ok(rounded)
    }

    pub async fn validate_price(&self, symbol: &str, price: Decimal) -> ServiceResult<Decimal> {
        let filters = self.symbol_filters(symbol).await?;
        let rounded = filters.check_price(price)?;
        if rounded != price {
            debug!(symbol, %price, %rounded, tick = %filters.tick_size, "price rounded down");
        }
        Ok(rounded)
    }

    /// Exchange minimum, then safety ceiling, then safety floor
    pub async fn validate_notional(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> ServiceResult<Decimal> {
        let filters = self.symbol_filters(symbol).await?;
        let notional = quantity * price;
        self.limits.check_notional(notional, filters.min_notional)?;
        Ok(notional)
    }

    /// Symbol, side, quantity
    pub async fn validate_market_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
    ) -> ServiceResult<ValidatedOrder> {
        let result: ServiceResult<ValidatedOrder> = async {
            let symbol = self.validate_symbol(symbol).await?;
            let side = self.validate_side(side)?;
            let quantity = self.validate_quantity(&symbol, quantity).await?;
            Ok(ValidatedOrder {
                symbol,
                side,
                quantity,
                price: None,
            })
        }
        .await;

        log_outcome("MARKET", symbol, result)
    }

    /// Symbol, side, quantity, price, then notional on the rounded values
    pub async fn validate_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> ServiceResult<ValidatedOrder> {
        let result: ServiceResult<ValidatedOrder> = async {
            let symbol = self.validate_symbol(symbol).await?;
            let side = self.validate_side(side)?;
            let quantity = self.validate_quantity(&symbol, quantity).await?;
            let price = self.validate_price(&symbol, price).await?;
            self.validate_notional(&symbol, quantity, price).await?;
            Ok(ValidatedOrder {
                symbol,
                side,
                quantity,
                price: Some(price),
            })
        }
        .await;

        log_outcome("LIMIT", symbol, result)
    }

    /// Last traded price
    pub async fn current_price(&self, symbol: &str) -> ServiceResult<Decimal> {
        Ok(self.api.ticker_price(symbol).await?)
    }

    pub async fn symbol_filters(&self, symbol: &str) -> ServiceResult<SymbolFilters> {
        self.filters
            .get_filters(symbol)
            .await
            .map_err(|e| symbol_error(e, symbol))
    }
}

/// An unknown symbol is bad input, not an exchange failure
fn symbol_error(err: ExchangeError, symbol: &str) -> ServiceError {
    match err {
        ExchangeError::SymbolNotFound(_) => {
            ValidationError::SymbolNotFound(symbol.to_string()).into()
        }
        other => other.into(),
    }
}

fn log_outcome<T>(order_type: &str, symbol: &str, result: ServiceResult<T>) -> ServiceResult<T> {
    match &result {
        Ok(_) => info!(order_type, symbol, "validation passed"),
        Err(e) => warn!(order_type, symbol, error = %e, "validation failed"),
    }
    result
}
