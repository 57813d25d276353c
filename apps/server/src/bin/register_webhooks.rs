//! Registers the sync webhooks with the configured store.
//!
//! Reads the same environment as the server plus `APP_URL`.

use anyhow::Context;
use variantsync_server::{config::Config, init_tracing, registration::register_webhooks};
use variantsync_shopify::ShopifyClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let app_url = config
        .app_url
        .as_deref()
        .context("APP_URL is required to register webhooks")?;
    let client = ShopifyClient::new(&config.shopify)?;
    register_webhooks(&client, app_url).await
}
