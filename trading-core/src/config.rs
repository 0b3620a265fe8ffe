// src/config.rs
// Settings for the order toolkit: defaults, optional config.toml, then the
// environment (a .env file is honoured).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use trading_common::data::SafetyLimits;

const MAINNET_API: &str = "https://fapi.binance.com";
const TESTNET_API: &str = "https://testnet.binancefuture.com";

#[derive(Debug, Deserialize, Clone)]
pub struct Api {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub secret: String,
    pub testnet: bool,
    pub recv_window_ms: u64,
    pub timeout_secs: u64,
}

impl Api {
    pub fn base_url(&self) -> &'static str {
        if self.testnet {
            TESTNET_API
        } else {
            MAINNET_API
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.key.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Logging {
    pub level: String,
    pub file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Safety {
    pub max_order_value_usd: Decimal,
    pub min_order_value_usd: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: Api,
    pub logging: Logging,
    pub safety: Safety,
    pub quote_asset: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let s = Self::with_defaults()?
            .add_source(File::with_name("config").required(false))
            .set_override_option("api.key", env::var("BINANCE_API_KEY").ok())?
            .set_override_option("api.secret", env::var("BINANCE_API_SECRET").ok())?
            .set_override_option("api.testnet", env::var("TESTNET").ok())?
            .set_override_option("logging.level", env::var("LOG_LEVEL").ok())?
            .build()?;

        s.try_deserialize()
    }

    /// Defaults only, no file and no environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api.key", "")?
            .set_default("api.secret", "")?
            .set_default("api.testnet", true)?
            .set_default("api.recv_window_ms", 5000)?
            .set_default("api.timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.file", "bot.log")?
            .set_default("safety.max_order_value_usd", 10000.0)?
            .set_default("safety.min_order_value_usd", 10.0)?
            .set_default("quote_asset", "USDT")
    }

    pub fn safety_limits(&self) -> SafetyLimits {
        SafetyLimits {
            min_order_value: self.safety.min_order_value_usd,
            max_order_value: self.safety.max_order_value_usd,
        }
    }

    /// Live commands refuse to start without a key pair
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.api.has_credentials() {
            return Ok(());
        }
        Err(ConfigError::Message(
            "API credentials not found. Set BINANCE_API_KEY and BINANCE_API_SECRET in .env".to_string(),
        ))
    }

    pub fn network_name(&self) -> &'static str {
        if self.api.testnet {
            "TESTNET"
        } else {
            "MAINNET"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let settings = Settings::defaults().unwrap();
        assert!(settings.api.testnet);
        assert_eq!(settings.api.base_url(), TESTNET_API);
        assert_eq!(settings.api.recv_window_ms, 5000);
        assert_eq!(settings.logging.file, "bot.log");
        assert_eq!(settings.quote_asset, "USDT");

        let limits = settings.safety_limits();
        assert_eq!(limits.max_order_value, dec!(10000));
        assert_eq!(limits.min_order_value, dec!(10));
    }

    #[test]
    fn test_credentials_required_for_live() {
        let mut settings = Settings::defaults().unwrap();
        assert!(settings.require_credentials().is_err());

        settings.api.key = "key".to_string();
        settings.api.secret = "secret".to_string();
        assert!(settings.require_credentials().is_ok());
    }
}
