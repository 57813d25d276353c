use thiserror::Error;

/// Errors raised while setting up a [`ShopifyClient`](crate::ShopifyClient).
///
/// Failures of individual calls are reported as
/// [`ClientError`](variantsync_inventory::ClientError) instead.
#[derive(Error, Debug)]
pub enum ShopifyError {
    #[error("Invalid access token format: {0}")]
    InvalidAccessToken(String),

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(String),
}
