//! HTTP client for the Shopify Admin GraphQL API.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use variantsync_inventory::{
    ClientError, GroupKey, InventoryClient, InventoryLevel, VariantPage, VariantRecord,
    WriteOutcome,
};

use crate::config::ShopifyConfig;
use crate::error::ShopifyError;
use crate::models::{
    parse_graphql_response, parse_retry_after, InventoryItemData, SetQuantitiesData, VariantData,
    VariantsData,
};
use crate::queries;

const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-shopify-access-token");

/// Inventory backend talking to one Shopify store.
///
/// Every trait call is a single GraphQL request. Throttling surfaces as
/// [`ClientError::RateLimited`]; wrap the client in a
/// [`RetryingClient`](variantsync_inventory::RetryingClient) to retry it.
///
/// # Example
///
/// ```ignore
/// let config = ShopifyConfig::new("my-shop.myshopify.com", "shpat_...");
/// let client = ShopifyClient::new(&config)?;
/// let level = client.read_quantity("gid://shopify/InventoryItem/1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShopifyClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: HeaderValue,
}

impl ShopifyClient {
    /// Create a client for the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or the
    /// HTTP client cannot be initialized.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut access_token = HeaderValue::from_str(&config.access_token)
            .map_err(|e| ShopifyError::InvalidAccessToken(e.to_string()))?;
        access_token.set_sensitive(true);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ShopifyError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            access_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCESS_TOKEN_HEADER, self.access_token.clone());
        headers
    }

    /// POST a GraphQL document and return its `data`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        debug!("[Shopify] {}", operation);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("{} failed: {}", operation, e)))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(format!("Failed to read response: {}", e)))?;

        let result = parse_graphql_response(status, retry_after, &body);
        if let Err(ClientError::RateLimited { retry_after }) = &result {
            warn!(
                "[Shopify] {} throttled (status {}), retry after {:?}",
                operation, status, retry_after
            );
        }
        result
    }
}

#[async_trait]
impl InventoryClient for ShopifyClient {
    async fn search_by_group_prefix(
        &self,
        group: &GroupKey,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<VariantPage, ClientError> {
        let data: VariantsData = self
            .execute(
                "searchVariantsBySku",
                queries::SEARCH_VARIANTS,
                json!({
                    "query": group.search_query(),
                    "first": page_size,
                    "after": cursor,
                }),
            )
            .await?;
        Ok(data.product_variants.into_page())
    }

    async fn read_quantity(
        &self,
        inventory_item_id: &str,
    ) -> Result<Option<InventoryLevel>, ClientError> {
        let data: InventoryItemData = self
            .execute(
                "getInventoryLevel",
                queries::GET_INVENTORY_LEVEL,
                json!({ "inventoryItemId": inventory_item_id }),
            )
            .await?;
        Ok(data.into_level())
    }

    async fn write_quantity(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        quantity: i64,
    ) -> Result<WriteOutcome, ClientError> {
        let data: SetQuantitiesData = self
            .execute(
                "inventorySetQuantities",
                queries::SET_INVENTORY_QUANTITIES,
                json!({
                    "input": {
                        "reason": "correction",
                        "name": "available",
                        "ignoreCompareQuantity": true,
                        "quantities": [{
                            "inventoryItemId": inventory_item_id,
                            "locationId": location_id,
                            "quantity": quantity,
                        }],
                    }
                }),
            )
            .await?;
        data.into_outcome()
    }

    async fn resolve_inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<String>, ClientError> {
        let data: VariantData = self
            .execute(
                "getVariant",
                queries::GET_VARIANT_INVENTORY_ITEM,
                json!({ "id": variant_id }),
            )
            .await?;
        Ok(data.into_inventory_item_id())
    }

    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<VariantRecord>, ClientError> {
        let data: VariantsData = self
            .execute(
                "findVariant",
                queries::FIND_VARIANT_BY_SKU,
                json!({ "query": format!("sku:{}", sku) }),
            )
            .await?;
        Ok(data.product_variants.into_first())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_rejects_invalid_token() {
        let config = ShopifyConfig::new("my-shop.myshopify.com", "bad\ntoken");
        assert!(matches!(
            ShopifyClient::new(&config),
            Err(ShopifyError::InvalidAccessToken(_))
        ));
    }

    #[test]
    fn test_headers() {
        let config = ShopifyConfig::new("my-shop.myshopify.com", "shpat_abc");
        let client = ShopifyClient::new(&config).unwrap();
        let headers = client.headers();

        assert_eq!(headers.get("x-shopify-access-token").unwrap(), "shpat_abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(
            client.endpoint(),
            "https://my-shop.myshopify.com/admin/api/2024-10/graphql.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_store_is_a_transport_error() {
        let config = ShopifyConfig::new("127.0.0.1:1", "shpat_abc")
            .with_timeout(Duration::from_secs(2));
        let client = ShopifyClient::new(&config).unwrap();

        let error = client.read_quantity("gid://shopify/InventoryItem/1").await.unwrap_err();

        assert!(matches!(error, ClientError::Transport(_)));
        assert_eq!(error.retry_class(), variantsync_inventory::RetryClass::Never);
    }
}
