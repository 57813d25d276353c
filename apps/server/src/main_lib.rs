use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use variantsync_inventory::{
    InventoryClient, RetryPolicy, RetryingClient, SyncConfig, SyncOrchestrator,
};
use variantsync_shopify::ShopifyClient;

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub orchestrator: SyncOrchestrator,
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(
        client: Arc<dyn InventoryClient>,
        sync_config: SyncConfig,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            orchestrator: SyncOrchestrator::new(client, sync_config),
            webhook_secret,
        }
    }
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let shopify = ShopifyClient::new(&config.shopify)?;
    tracing::info!("Shopify endpoint in use: {}", shopify.endpoint());

    let policy = RetryPolicy::default().with_max_attempts(config.retry_max_attempts);
    let client: Arc<dyn InventoryClient> = Arc::new(RetryingClient::new(shopify, policy));

    if config.webhook_secret.is_none() {
        tracing::warn!("SHOPIFY_WEBHOOK_SECRET is not set, webhook signatures are not verified");
    }

    Ok(Arc::new(AppState::new(
        client,
        SyncConfig::default(),
        config.webhook_secret.clone(),
    )))
}
