// Grid trading arithmetic: level generation, classification against the live
// price, re-arm pricing after fills, and realized profit bookkeeping.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::data::{Side, ValidationError, ValidationResult};

/// Levels closer than this fraction of the live price are not traded (0.1%)
pub const CURRENT_PRICE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTag {
    Buy,
    Sell,
    Current,
}

impl LevelTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelTag::Buy => "BUY",
            LevelTag::Sell => "SELL",
            LevelTag::Current => "CURRENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLevel {
    /// 1-based, lowest price first
    pub index: usize,
    pub price: Decimal,
    pub tag: LevelTag,
}

impl GridLevel {
    /// Side of the resting order for this level, `None` for the skipped level
    pub fn side(&self) -> Option<Side> {
        match self.tag {
            LevelTag::Buy => Some(Side::Buy),
            LevelTag::Sell => Some(Side::Sell),
            LevelTag::Current => None,
        }
    }
}

/// `num_grids + 1` evenly spaced prices from `lower` to `upper` inclusive
pub fn grid_prices(lower: Decimal, upper: Decimal, num_grids: u32) -> ValidationResult<Vec<Decimal>> {
    if num_grids == 0 {
        return Err(ValidationError::InvalidParameter(
            "Number of grids must be positive".to_string(),
        ));
    }
    if lower >= upper {
        return Err(ValidationError::InvalidParameter(format!(
            "Lower price {} must be less than upper price {}",
            lower, upper
        )));
    }

    let step = (upper - lower) / Decimal::from(num_grids);
    let prices = (0..=num_grids)
        .map(|i| {
            if i == num_grids {
                upper
            } else {
                lower + step * Decimal::from(i)
            }
        })
        .collect();
    Ok(prices)
}

pub fn classify_level(price: Decimal, current_price: Decimal) -> LevelTag {
    if current_price > Decimal::ZERO
        && ((price - current_price).abs() / current_price) < CURRENT_PRICE_TOLERANCE
    {
        return LevelTag::Current;
    }
    if price < current_price {
        LevelTag::Buy
    } else if price > current_price {
        LevelTag::Sell
    } else {
        LevelTag::Current
    }
}

/// Grid laid out against the price observed at setup time
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub lower: Decimal,
    pub upper: Decimal,
    pub num_grids: u32,
    pub step: Decimal,
    pub levels: Vec<GridLevel>,
}

impl GridPlan {
    pub fn new(lower: Decimal, upper: Decimal, num_grids: u32, current_price: Decimal) -> ValidationResult<Self> {
        let levels = grid_prices(lower, upper, num_grids)?
            .into_iter()
            .enumerate()
            .map(|(i, price)| GridLevel {
                index: i + 1,
                price,
                tag: classify_level(price, current_price),
            })
            .collect();

        Ok(Self {
            lower,
            upper,
            num_grids,
            step: (upper - lower) / Decimal::from(num_grids),
            levels,
        })
    }

    pub fn buy_count(&self) -> usize {
        self.levels.iter().filter(|l| l.tag == LevelTag::Buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.levels.iter().filter(|l| l.tag == LevelTag::Sell).count()
    }

    /// Quote currency tied up by the buy side of the grid
    pub fn required_investment(&self, quantity_per_grid: Decimal) -> Decimal {
        self.levels
            .iter()
            .filter(|l| l.tag == LevelTag::Buy)
            .map(|l| l.price * quantity_per_grid)
            .sum()
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.lower && price <= self.upper
    }

    /// Opposite-side order one grid step away from the fill
    pub fn replacement(&self, filled_side: Side, fill_price: Decimal) -> (Side, Decimal) {
        match filled_side {
            Side::Buy => (Side::Sell, fill_price + self.step),
            Side::Sell => (Side::Buy, fill_price - self.step),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OpenFill {
    price: Decimal,
    quantity: Decimal,
}

/// Pairs buy and sell fills first-in first-out and accumulates
/// `(sell - buy) * paired quantity`.
#[derive(Debug, Default)]
pub struct GridLedger {
    open_buys: VecDeque<OpenFill>,
    open_sells: VecDeque<OpenFill>,
    realized: Decimal,
    round_trips: u32,
}

impl GridLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fill and returns the profit it realized
    pub fn record_fill(&mut self, side: Side, price: Decimal, quantity: Decimal) -> Decimal {
        let (opposite, own) = match side {
            Side::Buy => (&mut self.open_sells, &mut self.open_buys),
            Side::Sell => (&mut self.open_buys, &mut self.open_sells),
        };

        let mut remaining = quantity;
        let mut profit = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(front) = opposite.front_mut() else {
                break;
            };
            let matched = remaining.min(front.quantity);
            let (sell_price, buy_price) = match side {
                Side::Buy => (front.price, price),
                Side::Sell => (price, front.price),
            };
            profit += (sell_price - buy_price) * matched;
            front.quantity -= matched;
            remaining -= matched;
            if front.quantity.is_zero() {
                opposite.pop_front();
                self.round_trips += 1;
            }
        }

        if remaining > Decimal::ZERO {
            own.push_back(OpenFill {
                price,
                quantity: remaining,
            });
        }

        self.realized += profit;
        profit
    }

    pub fn realized_profit(&self) -> Decimal {
        self.realized
    }

    pub fn round_trips(&self) -> u32 {
        self.round_trips
    }

    /// Net quantity still waiting for an opposite fill (positive = long)
    pub fn open_quantity(&self) -> Decimal {
        let long: Decimal = self.open_buys.iter().map(|f| f.quantity).sum();
        let short: Decimal = self.open_sells.iter().map(|f| f.quantity).sum();
        long - short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_levels_are_evenly_spaced() {
        let prices = grid_prices(dec!(100), dec!(200), 4).unwrap();
        assert_eq!(prices, vec![dec!(100), dec!(125), dec!(150), dec!(175), dec!(200)]);
    }

    #[test]
    fn test_last_level_is_exactly_upper() {
        let prices = grid_prices(dec!(100), dec!(200), 3).unwrap();
        assert_eq!(prices.len(), 4);
        assert_eq!(prices[0], dec!(100));
        assert_eq!(prices[3], dec!(200));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(grid_prices(dec!(200), dec!(100), 4).is_err());
        assert!(grid_prices(dec!(100), dec!(100), 4).is_err());
        assert!(grid_prices(dec!(100), dec!(200), 0).is_err());
    }

    #[test]
    fn test_classification_against_live_price() {
        let plan = GridPlan::new(dec!(100), dec!(200), 4, dec!(150.1)).unwrap();
        let tags: Vec<LevelTag> = plan.levels.iter().map(|l| l.tag).collect();
        assert_eq!(
            tags,
            vec![LevelTag::Buy, LevelTag::Buy, LevelTag::Current, LevelTag::Sell, LevelTag::Sell]
        );
        assert_eq!(plan.buy_count(), 2);
        assert_eq!(plan.sell_count(), 2);
        assert_eq!(plan.levels[2].side(), None);
        assert_eq!(plan.required_investment(dec!(2)), dec!(450));
    }

    #[test]
    fn test_level_outside_tolerance_is_traded() {
        // 0.2% away from the live price
        assert_eq!(classify_level(dec!(150), dec!(150.3)), LevelTag::Buy);
        assert_eq!(classify_level(dec!(150), dec!(150)), LevelTag::Current);
    }

    #[test]
    fn test_replacement_is_one_step_on_the_other_side() {
        let plan = GridPlan::new(dec!(100), dec!(200), 4, dec!(160)).unwrap();
        assert_eq!(plan.replacement(Side::Buy, dec!(125)), (Side::Sell, dec!(150)));
        assert_eq!(plan.replacement(Side::Sell, dec!(175)), (Side::Buy, dec!(150)));
        assert!(plan.contains(dec!(160)));
        assert!(!plan.contains(dec!(99)));
    }

    #[test]
    fn test_ledger_pairs_fills() {
        let mut ledger = GridLedger::new();
        assert_eq!(ledger.record_fill(Side::Buy, dec!(125), dec!(1)), Decimal::ZERO);
        assert_eq!(ledger.record_fill(Side::Sell, dec!(150), dec!(1)), dec!(25));

        // sell first, buy back lower
        assert_eq!(ledger.record_fill(Side::Sell, dec!(175), dec!(1)), Decimal::ZERO);
        assert_eq!(ledger.record_fill(Side::Buy, dec!(150), dec!(1)), dec!(25));

        assert_eq!(ledger.realized_profit(), dec!(50));
        assert_eq!(ledger.round_trips(), 2);
        assert_eq!(ledger.open_quantity(), Decimal::ZERO);
    }

    #[test]
    fn test_ledger_partial_pairing() {
        let mut ledger = GridLedger::new();
        ledger.record_fill(Side::Buy, dec!(100), dec!(0.5));
        ledger.record_fill(Side::Buy, dec!(110), dec!(0.5));

        let profit = ledger.record_fill(Side::Sell, dec!(120), dec!(0.75));
        // 0.5 * 20 + 0.25 * 10
        assert_eq!(profit, dec!(12.5));
        assert_eq!(ledger.open_quantity(), dec!(0.25));
        assert_eq!(ledger.round_trips(), 1);
    }
}
