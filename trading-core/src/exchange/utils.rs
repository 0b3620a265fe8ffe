// exchange/utils.rs
// Utility functions for the futures REST API

use super::ExchangeError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Upper-cases and trims a user supplied symbol
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Parse price string to Decimal
pub fn parse_price(price_str: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(price_str)
        .map_err(|e| ExchangeError::ParseError(format!("Invalid price '{}': {}", price_str, e)))
}

/// Parse size/quantity string to Decimal
pub fn parse_size(size_str: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(size_str)
        .map_err(|e| ExchangeError::ParseError(format!("Invalid size '{}': {}", size_str, e)))
}

/// Empty strings count as zero; the exchange leaves unused numeric fields blank
pub fn parse_or_zero(value: &str) -> Result<Decimal, ExchangeError> {
    if value.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_price(value)
}

/// Zero-valued optional prices (`"0"`, `"0.00"`) mean "not set"
pub fn parse_optional_price(value: Option<&str>) -> Result<Option<Decimal>, ExchangeError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let price = parse_or_zero(raw)?;
            Ok(if price.is_zero() { None } else { Some(price) })
        }
    }
}

/// Decimal as the exchange expects it on the wire, without trailing zeros
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(normalize_symbol(" btcusdt "), "BTCUSDT");
        assert_eq!(normalize_symbol("EthUsdt"), "ETHUSDT");
    }

    #[test]
    fn test_parsing() {
        assert_eq!(parse_price("50123.40").unwrap(), dec!(50123.40));
        assert!(parse_size("abc").is_err());
        assert_eq!(parse_or_zero("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_optional_price(Some("0.00")).unwrap(), None);
        assert_eq!(parse_optional_price(Some("9300")).unwrap(), Some(dec!(9300)));
        assert_eq!(parse_optional_price(None).unwrap(), None);
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(format_decimal(dec!(0.0100)), "0.01");
        assert_eq!(format_decimal(dec!(50000.0)), "50000");
        assert_eq!(format_decimal(dec!(0.001)), "0.001");
    }
}
