use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::filters::SymbolFilters;

// =================================================================
// Order Enums
// =================================================================

/// Order side as the exchange spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(ValidationError::InvalidSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    /// Stop-limit: rests until `stop_price` trades, then works as a limit at `price`
    Stop,
    #[serde(other)]
    Other,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::Stop => "STOP",
            OrderType::Other => "OTHER",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    Gtc,
    Ioc,
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GTC" => Ok(TimeInForce::Gtc),
            "IOC" => Ok(TimeInForce::Ioc),
            "FOK" => Ok(TimeInForce::Fok),
            _ => Err(ValidationError::InvalidParameter(format!(
                "Time in force must be GTC, IOC or FOK, got '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Expired => "EXPIRED",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =================================================================
// Instruments & Orders
// =================================================================

/// Exchange status string for a tradable instrument
pub const TRADING_STATUS: &str = "TRADING";

/// One entry of the exchange instrument list, filters already parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub status: String,
    pub filters: SymbolFilters,
}

impl Instrument {
    pub fn is_trading(&self) -> bool {
        self.status == TRADING_STATUS
    }
}

/// Order parameters that passed validation.
/// `quantity` and `price` are already truncated to step/tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedOrder {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
}

/// Everything the order-entry endpoint needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: None,
            reduce_only: false,
        }
    }

    pub fn limit(
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: Some(time_in_force),
            reduce_only: false,
        }
    }

    pub fn stop_limit(
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Stop,
            quantity,
            price: Some(limit_price),
            stop_price: Some(stop_price),
            time_in_force: Some(time_in_force),
            reduce_only: false,
        }
    }

    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    /// True when the order either fills right away or never rests on the book
    pub fn is_immediate(&self) -> bool {
        self.order_type == OrderType::Market
            || matches!(
                self.time_in_force,
                Some(TimeInForce::Ioc) | Some(TimeInForce::Fok)
            )
    }
}

/// Order as reported back by the exchange (or synthesized in dry-run mode)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: i64,
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub orig_qty: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub status: OrderStatus,
    pub executed_qty: Decimal,
    pub avg_price: Decimal,
    pub time_in_force: Option<TimeInForce>,
    pub simulated: bool,
}

impl OrderRecord {
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Executed quantity times average fill price
    pub fn filled_value(&self) -> Decimal {
        self.executed_qty * self.avg_price
    }
}

// =================================================================
// Errors
// =================================================================

/// Rejections of user input. Raised before anything is sent anywhere.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Symbol must be a {quote}-margined futures pair (e.g., BTC{quote}), got {symbol}")]
    InvalidSymbolFormat { symbol: String, quote: String },

    #[error("Symbol {0} not found on the exchange")]
    SymbolNotFound(String),

    #[error("Trading is not enabled for {symbol} (status {status})")]
    TradingDisabled { symbol: String, status: String },

    #[error("Side must be either 'BUY' or 'SELL', got '{0}'")]
    InvalidSide(String),

    #[error("Quantity {quantity} below minimum {min}")]
    QuantityBelowMinimum { quantity: Decimal, min: Decimal },

    #[error("Quantity {quantity} exceeds maximum {max}")]
    QuantityAboveMaximum { quantity: Decimal, max: Decimal },

    #[error("Price {price} below minimum {min}")]
    PriceBelowMinimum { price: Decimal, min: Decimal },

    #[error("Price {price} exceeds maximum {max}")]
    PriceAboveMaximum { price: Decimal, max: Decimal },

    #[error("Order value {notional} below exchange minimum {min}")]
    NotionalBelowExchangeMinimum { notional: Decimal, min: Decimal },

    #[error("Order value {notional} exceeds safety limit {max}")]
    NotionalAboveSafetyLimit { notional: Decimal, max: Decimal },

    #[error("Order value {notional} below safety minimum {min}")]
    NotionalBelowSafetyFloor { notional: Decimal, min: Decimal },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;
