use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use variantsync_shopify::{ShopifyConfig, DEFAULT_API_VERSION};

/// Log output format selected by `VS_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("Invalid VS_LOG_FORMAT: {}", other)),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub shopify: ShopifyConfig,
    /// When unset, webhook signatures are not checked.
    pub webhook_secret: Option<String>,
    pub retry_max_attempts: u32,
    pub log_format: LogFormat,
    /// Public base URL of this service, used when registering webhooks.
    pub app_url: Option<String>,
}

impl Config {
    /// Read the configuration from the environment, loading `.env` first.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr: SocketAddr = var("VS_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid VS_LISTEN_ADDR")?;

        let store_domain =
            var("SHOPIFY_STORE_DOMAIN").ok_or_else(|| anyhow!("SHOPIFY_STORE_DOMAIN is required"))?;
        let access_token =
            var("SHOPIFY_ACCESS_TOKEN").ok_or_else(|| anyhow!("SHOPIFY_ACCESS_TOKEN is required"))?;
        let api_version =
            var("SHOPIFY_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let timeout_ms: u64 = var("VS_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .context("Invalid VS_REQUEST_TIMEOUT_MS")?;

        let retry_max_attempts: u32 = var("VS_RETRY_MAX_ATTEMPTS")
            .unwrap_or_else(|| "5".into())
            .parse()
            .context("Invalid VS_RETRY_MAX_ATTEMPTS")?;

        let log_format: LogFormat = var("VS_LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            listen_addr,
            shopify: ShopifyConfig::new(store_domain, access_token)
                .with_api_version(api_version)
                .with_timeout(Duration::from_millis(timeout_ms)),
            webhook_secret: var("SHOPIFY_WEBHOOK_SECRET"),
            retry_max_attempts,
            log_format,
            app_url: var("APP_URL").map(|url| url.trim().trim_end_matches('/').to_string()),
        })
    }
}
