// TWAP planning: equal slices of a total quantity, evenly spaced in time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;

use crate::data::{OrderRecord, SymbolFilters, ValidationError, ValidationResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TwapSlice {
    /// 1-based position in the schedule
    pub index: u32,
    pub quantity: Decimal,
    pub target_time: DateTime<Utc>,
}

/// The slice size is truncated to the step size independently of the total,
/// so `actual_total()` can fall short of what was requested. The shortfall is
/// reported to the operator, never topped up.
#[derive(Debug, Clone, PartialEq)]
pub struct TwapPlan {
    pub requested_total: Decimal,
    pub slice_quantity: Decimal,
    pub num_slices: u32,
    pub duration: Duration,
}

impl TwapPlan {
    pub fn new(
        total_quantity: Decimal,
        num_slices: u32,
        duration: Duration,
        filters: &SymbolFilters,
    ) -> ValidationResult<Self> {
        if num_slices == 0 {
            return Err(ValidationError::InvalidParameter(
                "Number of intervals must be positive".to_string(),
            ));
        }
        if total_quantity <= Decimal::ZERO {
            return Err(ValidationError::InvalidParameter(format!(
                "Total quantity must be positive, got {}",
                total_quantity
            )));
        }

        let raw_slice = total_quantity / Decimal::from(num_slices);

        Ok(Self {
            requested_total: total_quantity,
            slice_quantity: filters.round_quantity(raw_slice),
            num_slices,
            duration,
        })
    }

    pub fn actual_total(&self) -> Decimal {
        self.slice_quantity * Decimal::from(self.num_slices)
    }

    /// Requested minus what the rounded slices add up to
    pub fn shortfall(&self) -> Decimal {
        self.requested_total - self.actual_total()
    }

    /// Pause between two consecutive slices
    pub fn interval(&self) -> Duration {
        self.duration / self.num_slices
    }

    pub fn schedule(&self, start: DateTime<Utc>) -> Vec<TwapSlice> {
        let interval_ms = self.interval().as_millis() as i64;
        (0..self.num_slices)
            .map(|i| TwapSlice {
                index: i + 1,
                quantity: self.slice_quantity,
                target_time: start + chrono::Duration::milliseconds(interval_ms * i as i64),
            })
            .collect()
    }

    pub fn estimated_completion(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + chrono::Duration::milliseconds(self.duration.as_millis() as i64)
    }
}

/// Aggregate figures over the slices that actually executed
#[derive(Debug, Clone, PartialEq)]
pub struct TwapSummary {
    pub slices_executed: usize,
    pub total_quantity: Decimal,
    pub total_cost: Decimal,
    pub average_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl TwapSummary {
    pub fn from_records(records: &[OrderRecord]) -> Self {
        let total_quantity: Decimal = records.iter().map(|r| r.executed_qty).sum();
        let total_cost: Decimal = records.iter().map(|r| r.filled_value()).sum();
        let average_price = if total_quantity > Decimal::ZERO {
            total_cost / total_quantity
        } else {
            Decimal::ZERO
        };

        let fill_prices: Vec<Decimal> = records
            .iter()
            .filter(|r| r.executed_qty > Decimal::ZERO)
            .map(|r| r.avg_price)
            .collect();

        Self {
            slices_executed: records.len(),
            total_quantity,
            total_cost,
            average_price,
            min_price: fill_prices.iter().copied().min().unwrap_or(Decimal::ZERO),
            max_price: fill_prices.iter().copied().max().unwrap_or(Decimal::ZERO),
        }
    }

    pub fn price_range(&self) -> Decimal {
        self.max_price - self.min_price
    }

    /// Average fill versus the reference price, in percent
    pub fn drift_pct(&self, start_price: Decimal) -> Decimal {
        if start_price.is_zero() || self.total_quantity.is_zero() {
            return Decimal::ZERO;
        }
        (self.average_price - start_price) / start_price * Decimal::from(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{OrderStatus, OrderType, Side};
    use rust_decimal_macros::dec;

    fn step_filters(step: Decimal) -> SymbolFilters {
        SymbolFilters {
            min_qty: step,
            step_size: step,
            ..SymbolFilters::default()
        }
    }

    fn filled(qty: Decimal, price: Decimal) -> OrderRecord {
        OrderRecord {
            order_id: 1,
            client_order_id: None,
            symbol: "BTCUSDT".to_string(),
            side: Side::Buy,
            order_type: OrderType::Market,
            orig_qty: qty,
            price: None,
            stop_price: None,
            status: OrderStatus::Filled,
            executed_qty: qty,
            avg_price: price,
            time_in_force: None,
            simulated: true,
        }
    }

    #[test]
    fn test_even_split() {
        let plan = TwapPlan::new(dec!(1.0), 5, Duration::from_secs(300), &step_filters(dec!(0.01))).unwrap();
        assert_eq!(plan.slice_quantity, dec!(0.2));
        assert_eq!(plan.actual_total(), dec!(1.0));
        assert_eq!(plan.shortfall(), Decimal::ZERO);
        assert_eq!(plan.interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_uneven_split_reports_shortfall() {
        let plan = TwapPlan::new(dec!(0.07), 3, Duration::from_secs(90), &step_filters(dec!(0.01))).unwrap();
        assert_eq!(plan.slice_quantity, dec!(0.02));
        assert_eq!(plan.actual_total(), dec!(0.06));
        assert!(plan.actual_total() < plan.requested_total);
        assert_eq!(plan.shortfall(), dec!(0.01));
    }

    #[test]
    fn test_rejects_degenerate_plans() {
        let filters = step_filters(dec!(0.01));
        assert!(TwapPlan::new(dec!(1), 0, Duration::from_secs(60), &filters).is_err());
        assert!(TwapPlan::new(dec!(0), 3, Duration::from_secs(60), &filters).is_err());
    }

    #[test]
    fn test_schedule_spacing() {
        let plan = TwapPlan::new(dec!(0.3), 3, Duration::from_secs(180), &step_filters(dec!(0.01))).unwrap();
        let start = Utc::now();
        let slices = plan.schedule(start);

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].index, 1);
        assert_eq!(slices[0].target_time, start);
        assert_eq!(slices[2].target_time - start, chrono::Duration::seconds(120));
        assert!(slices.iter().all(|s| s.quantity == dec!(0.1)));
        assert_eq!(plan.estimated_completion(start) - start, chrono::Duration::seconds(180));
    }

    #[test]
    fn test_summary_weights_by_quantity() {
        let records = vec![filled(dec!(0.1), dec!(100)), filled(dec!(0.3), dec!(200))];
        let summary = TwapSummary::from_records(&records);

        assert_eq!(summary.slices_executed, 2);
        assert_eq!(summary.total_quantity, dec!(0.4));
        assert_eq!(summary.total_cost, dec!(70));
        assert_eq!(summary.average_price, dec!(175));
        assert_eq!(summary.price_range(), dec!(100));
        assert_eq!(summary.drift_pct(dec!(175)), Decimal::ZERO);

        let empty = TwapSummary::from_records(&[]);
        assert_eq!(empty.average_price, Decimal::ZERO);
        assert_eq!(empty.drift_pct(dec!(100)), Decimal::ZERO);
    }
}
