//! Shopify Admin GraphQL backend.
//!
//! [`ShopifyClient`] implements the engine's
//! [`InventoryClient`](variantsync_inventory::InventoryClient) on top of the
//! Admin API. Throttling is reported as
//! [`ClientError::RateLimited`](variantsync_inventory::ClientError) and left to
//! the engine's retrying wrapper.
//!
//! The client also manages the store's webhook subscriptions, which the
//! server's registration tool uses.

mod client;
mod config;
mod error;
mod models;
mod queries;
mod webhooks;

pub use client::ShopifyClient;
pub use config::{ShopifyConfig, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
pub use error::ShopifyError;
pub use webhooks::{SubscriptionOutcome, WebhookSubscription};
