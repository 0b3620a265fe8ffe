// src/context.rs
// Everything a command needs, built once and passed down explicitly

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::exchange::{ExchangeConnector, FilterCache, FuturesApi};
use crate::service::{Confirm, OrderSubmitter, OrderValidator, ServiceResult};

pub struct TradingContext {
    pub settings: Settings,
    pub api: Arc<dyn FuturesApi>,
    pub filters: Arc<FilterCache>,
    pub validator: OrderValidator,
    pub submitter: OrderSubmitter,
}

impl TradingContext {
    pub fn new(
        settings: Settings,
        api: Arc<dyn FuturesApi>,
        confirmer: Arc<dyn Confirm>,
        dry_run: bool,
    ) -> Self {
        let filters = Arc::new(FilterCache::new(api.clone()));
        let validator = OrderValidator::new(
            api.clone(),
            filters.clone(),
            settings.safety_limits(),
            &settings.quote_asset,
        );
        let submitter = OrderSubmitter::new(api.clone(), confirmer, dry_run);

        Self {
            settings,
            api,
            filters,
            validator,
            submitter,
        }
    }

    /// Builds the REST connector from settings. Live mode needs credentials.
    pub fn connect(settings: Settings, confirmer: Arc<dyn Confirm>, dry_run: bool) -> ServiceResult<Self> {
        if !dry_run {
            settings.require_credentials()?;
        }

        let connector = ExchangeConnector::new(&settings.api)?;
        info!(
            base_url = connector.base_url(),
            authenticated = connector.is_authenticated(),
            dry_run,
            "exchange client initialized"
        );

        Ok(Self::new(settings, Arc::new(connector), confirmer, dry_run))
    }

    pub fn is_dry_run(&self) -> bool {
        self.submitter.is_dry_run()
    }
}
