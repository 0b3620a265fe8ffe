// Exchange trading rules for a single symbol, plus the operator's own guardrails.
// All arithmetic stays in Decimal so small step sizes never drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{ValidationError, ValidationResult};

/// Truncates `value` to a whole number of `step`s. A zero step means
/// unconstrained precision and returns the value untouched.
pub fn round_down_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    (value / step).trunc() * step
}

/// Price, lot size and notional rules for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFilters {
    pub min_qty: Decimal,
    pub max_qty: Decimal,
    pub step_size: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub tick_size: Decimal,
    pub min_notional: Decimal,
}

impl Default for SymbolFilters {
    fn default() -> Self {
        Self {
            min_qty: Decimal::ZERO,
            max_qty: Decimal::MAX,
            step_size: Decimal::ZERO,
            min_price: Decimal::ZERO,
            max_price: Decimal::MAX,
            tick_size: Decimal::ZERO,
            min_notional: Decimal::ZERO,
        }
    }
}

impl SymbolFilters {
    pub fn round_quantity(&self, quantity: Decimal) -> Decimal {
        round_down_to_step(quantity, self.step_size)
    }

    pub fn round_price(&self, price: Decimal) -> Decimal {
        round_down_to_step(price, self.tick_size)
    }

    /// Bounds check first, rounding only for in-range values
    pub fn check_quantity(&self, quantity: Decimal) -> ValidationResult<Decimal> {
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::InvalidParameter(format!(
                "Quantity must be positive, got {}",
                quantity
            )));
        }
        if quantity < self.min_qty {
            return Err(ValidationError::QuantityBelowMinimum {
                quantity,
                min: self.min_qty,
            });
        }
        if quantity > self.max_qty {
            return Err(ValidationError::QuantityAboveMaximum {
                quantity,
                max: self.max_qty,
            });
        }

        let rounded = self.round_quantity(quantity);
        // only reachable when min_qty is not itself a multiple of step_size
        if rounded < self.min_qty {
            return Err(ValidationError::QuantityBelowMinimum {
                quantity: rounded,
                min: self.min_qty,
            });
        }
        Ok(rounded)
    }

    pub fn check_price(&self, price: Decimal) -> ValidationResult<Decimal> {
        if price <= Decimal::ZERO {
            return Err(ValidationError::InvalidParameter(format!(
                "Price must be positive, got {}",
                price
            )));
        }
        if price < self.min_price {
            return Err(ValidationError::PriceBelowMinimum {
                price,
                min: self.min_price,
            });
        }
        if price > self.max_price {
            return Err(ValidationError::PriceAboveMaximum {
                price,
                max: self.max_price,
            });
        }

        let rounded = self.round_price(price);
        if rounded < self.min_price {
            return Err(ValidationError::PriceBelowMinimum {
                price: rounded,
                min: self.min_price,
            });
        }
        Ok(rounded)
    }
}

/// Operator guardrails on the value of a single order, independent of the exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyLimits {
    pub min_order_value: Decimal,
    pub max_order_value: Decimal,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            min_order_value: Decimal::from(10),
            max_order_value: Decimal::from(10_000),
        }
    }
}

impl SafetyLimits {
    /// Exchange minimum first, then the ceiling, then the floor.
    pub fn check_notional(&self, notional: Decimal, exchange_min: Decimal) -> ValidationResult<()> {
        if notional < exchange_min {
            return Err(ValidationError::NotionalBelowExchangeMinimum {
                notional,
                min: exchange_min,
            });
        }
        if notional > self.max_order_value {
            return Err(ValidationError::NotionalAboveSafetyLimit {
                notional,
                max: self.max_order_value,
            });
        }
        if notional < self.min_order_value {
            return Err(ValidationError::NotionalBelowSafetyFloor {
                notional,
                min: self.min_order_value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_filters() -> SymbolFilters {
        SymbolFilters {
            min_qty: dec!(0.001),
            max_qty: dec!(1000),
            step_size: dec!(0.001),
            min_price: dec!(0.1),
            max_price: dec!(1000000),
            tick_size: dec!(0.1),
            min_notional: dec!(10),
        }
    }

    #[test]
    fn test_quantity_truncates_never_rounds_up() {
        let filters = btc_filters();
        for (input, expected) in [
            (dec!(0.0019), dec!(0.001)),
            (dec!(0.0125), dec!(0.012)),
            (dec!(1.9999), dec!(1.999)),
            (dec!(5), dec!(5)),
        ] {
            let rounded = filters.check_quantity(input).unwrap();
            assert_eq!(rounded, expected);
            assert!(rounded <= input);
            assert!(rounded >= filters.min_qty);
            assert_eq!(rounded % filters.step_size, Decimal::ZERO);
        }
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let filters = btc_filters();
        let once = filters.check_quantity(dec!(0.123456)).unwrap();
        let twice = filters.check_quantity(once).unwrap();
        assert_eq!(once, twice);

        let price = filters.check_price(dec!(50123.456)).unwrap();
        assert_eq!(price, dec!(50123.4));
        assert_eq!(filters.check_price(price).unwrap(), price);
    }

    #[test]
    fn test_out_of_bounds_rejected_before_rounding() {
        let filters = btc_filters();
        assert_eq!(
            filters.check_quantity(dec!(0.0009)),
            Err(ValidationError::QuantityBelowMinimum {
                quantity: dec!(0.0009),
                min: dec!(0.001)
            })
        );
        assert_eq!(
            filters.check_quantity(dec!(1000.0001)),
            Err(ValidationError::QuantityAboveMaximum {
                quantity: dec!(1000.0001),
                max: dec!(1000)
            })
        );
        assert!(matches!(
            filters.check_price(dec!(0.05)),
            Err(ValidationError::PriceBelowMinimum { .. })
        ));
        assert!(matches!(
            filters.check_quantity(Decimal::ZERO),
            Err(ValidationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_step_skips_rounding() {
        let filters = SymbolFilters::default();
        assert_eq!(filters.check_quantity(dec!(0.123456789)).unwrap(), dec!(0.123456789));
        assert_eq!(filters.check_price(dec!(1.23456789)).unwrap(), dec!(1.23456789));
    }

    #[test]
    fn test_small_steps_do_not_drift() {
        let filters = SymbolFilters {
            step_size: dec!(0.00000001),
            ..SymbolFilters::default()
        };
        assert_eq!(filters.check_quantity(dec!(0.123456789)).unwrap(), dec!(0.12345678));
    }

    #[test]
    fn test_notional_limits() {
        let limits = SafetyLimits::default();
        let notional = dec!(0.001) * dec!(50000);
        assert_eq!(notional, dec!(50));
        assert!(limits.check_notional(notional, dec!(10)).is_ok());

        let notional = dec!(0.001) * dec!(20000000);
        assert_eq!(
            limits.check_notional(notional, dec!(10)),
            Err(ValidationError::NotionalAboveSafetyLimit {
                notional: dec!(20000),
                max: dec!(10000)
            })
        );

        assert!(matches!(
            limits.check_notional(dec!(4), dec!(5)),
            Err(ValidationError::NotionalBelowExchangeMinimum { .. })
        ));
        assert!(matches!(
            limits.check_notional(dec!(6), dec!(5)),
            Err(ValidationError::NotionalBelowSafetyFloor { .. })
        ));
    }
}
