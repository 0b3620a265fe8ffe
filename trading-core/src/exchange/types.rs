// exchange/types.rs
// Account-side views returned by the futures API, already parsed

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use trading_common::data::Side;

/// Wallet balance of a single margin asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetBalance {
    pub asset: String,
    pub wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub unrealized_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInfo {
    pub total_wallet_balance: Decimal,
    pub total_unrealized_profit: Decimal,
    pub available_balance: Decimal,
    pub assets: Vec<AssetBalance>,
}

impl AccountInfo {
    pub fn asset(&self, asset: &str) -> Option<&AssetBalance> {
        self.assets.iter().find(|a| a.asset == asset)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRisk {
    pub symbol: String,
    /// Signed, negative means short
    pub position_amt: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_profit: Decimal,
    pub leverage: Decimal,
}

impl PositionRisk {
    pub fn is_open(&self) -> bool {
        !self.position_amt.is_zero()
    }
}

/// One execution from the account trade list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTrade {
    pub id: i64,
    pub order_id: i64,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub qty: Decimal,
    pub realized_pnl: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    pub time: DateTime<Utc>,
}
