//! Admin API response shapes and their conversion into engine records.

use std::time::Duration;

use serde::Deserialize;
use variantsync_inventory::{ClientError, InventoryLevel, VariantPage, VariantRecord, WriteOutcome};

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdNode {
    pub id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Variants
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantsData {
    pub product_variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantConnection {
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<Edge<VariantNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantNode {
    pub id: String,
    pub sku: Option<String>,
    pub inventory_item: Option<IdNode>,
}

impl VariantNode {
    /// Variants without an inventory item cannot take part in a sync.
    fn into_record(self) -> Option<VariantRecord> {
        let inventory_item = self.inventory_item?;
        Some(VariantRecord {
            variant_id: self.id,
            sku: self.sku,
            inventory_item_id: inventory_item.id,
        })
    }
}

impl VariantConnection {
    pub fn into_page(self) -> VariantPage {
        VariantPage {
            records: self
                .edges
                .into_iter()
                .filter_map(|edge| edge.node.into_record())
                .collect(),
            has_next_page: self.page_info.has_next_page,
            next_cursor: self.page_info.end_cursor,
        }
    }

    pub fn into_first(self) -> Option<VariantRecord> {
        self.edges
            .into_iter()
            .next()
            .and_then(|edge| edge.node.into_record())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantData {
    pub product_variant: Option<VariantInventoryItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantInventoryItem {
    pub inventory_item: Option<IdNode>,
}

impl VariantData {
    pub fn into_inventory_item_id(self) -> Option<String> {
        self.product_variant
            .and_then(|variant| variant.inventory_item)
            .map(|item| item.id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inventory levels
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventoryItemData {
    pub inventory_item: Option<InventoryItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventoryItemNode {
    pub inventory_levels: Connection<LevelNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelNode {
    pub location: IdNode,
    #[serde(default)]
    pub quantities: Vec<NamedQuantity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedQuantity {
    pub name: String,
    pub quantity: i64,
}

impl InventoryItemData {
    /// The `available` quantity at the item's first location.
    pub fn into_level(self) -> Option<InventoryLevel> {
        let level = self
            .inventory_item?
            .inventory_levels
            .edges
            .into_iter()
            .next()?
            .node;
        let available = level.quantities.iter().find(|q| q.name == "available")?;
        Some(InventoryLevel {
            quantity: available.quantity,
            location_id: level.location.id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetQuantitiesData {
    pub inventory_set_quantities: Option<SetQuantitiesPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetQuantitiesPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.as_deref().unwrap_or("UNKNOWN"),
            self.field.as_deref().map(|path| path.join(".")).unwrap_or_default(),
            self.message
        )
    }
}

impl SetQuantitiesData {
    pub fn into_outcome(self) -> Result<WriteOutcome, ClientError> {
        let payload = self.inventory_set_quantities.ok_or_else(|| {
            ClientError::InvalidResponse("inventorySetQuantities returned no payload".to_string())
        })?;

        if payload.user_errors.is_empty() {
            return Ok(WriteOutcome::Applied);
        }

        let reason = payload
            .user_errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(WriteOutcome::Rejected { reason })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response classification
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a `Retry-After` header value given in (possibly fractional) seconds.
///
/// Values a [`Duration`] cannot hold are treated as absent.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

/// Turn a raw HTTP answer into the `data` of a GraphQL response.
///
/// 429 and in-band `Throttled` errors become [`ClientError::RateLimited`],
/// carrying the `Retry-After` hint only when the store sent one; every other
/// failure is terminal.
pub(crate) fn parse_graphql_response<T: serde::de::DeserializeOwned>(
    status: u16,
    retry_after: Option<Duration>,
    body: &str,
) -> Result<T, ClientError> {
    if status == 429 {
        return Err(ClientError::RateLimited {
            retry_after,
        });
    }

    if !(200..300).contains(&status) {
        return Err(ClientError::api(
            status,
            body.chars().take(200).collect::<String>(),
        ));
    }

    let response: GraphQlResponse<T> = serde_json::from_str(body)
        .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if !response.errors.is_empty() {
        if response
            .errors
            .iter()
            .any(|e| e.message.to_lowercase().contains("throttled"))
        {
            return Err(ClientError::RateLimited { retry_after: None });
        }
        let messages = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ClientError::GraphQl(messages));
    }

    response
        .data
        .ok_or_else(|| ClientError::InvalidResponse("Response carried no data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_page() {
        let body = r#"{"data": {"productVariants": {
            "pageInfo": {"hasNextPage": true, "endCursor": "eyJsYXN0X2lkIjo0fQ"},
            "edges": [
                {"node": {"id": "gid://shopify/ProductVariant/1", "sku": "BXAAA-1",
                          "inventoryItem": {"id": "gid://shopify/InventoryItem/11"}}},
                {"node": {"id": "gid://shopify/ProductVariant/2", "sku": null,
                          "inventoryItem": {"id": "gid://shopify/InventoryItem/12"}}},
                {"node": {"id": "gid://shopify/ProductVariant/3", "sku": "BXAAA-3",
                          "inventoryItem": null}}
            ]
        }}}"#;

        let data: VariantsData = parse_graphql_response(200, None, body).unwrap();
        let page = data.product_variants.into_page();

        assert!(page.has_next_page);
        assert_eq!(page.next_cursor.as_deref(), Some("eyJsYXN0X2lkIjo0fQ"));
        assert_eq!(page.records.len(), 2);
        assert_eq!(
            page.records[0],
            VariantRecord::new(
                "gid://shopify/ProductVariant/1",
                "BXAAA-1",
                "gid://shopify/InventoryItem/11"
            )
        );
        assert_eq!(page.records[1].sku, None);
    }

    #[test]
    fn test_first_variant() {
        let body = r#"{"data": {"productVariants": {
            "pageInfo": {"hasNextPage": false, "endCursor": null},
            "edges": []
        }}}"#;
        let data: VariantsData = parse_graphql_response(200, None, body).unwrap();
        assert_eq!(data.product_variants.into_first(), None);
    }

    #[test]
    fn test_inventory_level() {
        let body = r#"{"data": {"inventoryItem": {"inventoryLevels": {"edges": [
            {"node": {"location": {"id": "gid://shopify/Location/7"},
                      "quantities": [{"name": "available", "quantity": -2}]}},
            {"node": {"location": {"id": "gid://shopify/Location/8"},
                      "quantities": [{"name": "available", "quantity": 40}]}}
        ]}}}}"#;

        let data: InventoryItemData = parse_graphql_response(200, None, body).unwrap();

        assert_eq!(
            data.into_level(),
            Some(InventoryLevel {
                quantity: -2,
                location_id: "gid://shopify/Location/7".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_inventory_level() {
        let no_item: InventoryItemData =
            parse_graphql_response(200, None, r#"{"data": {"inventoryItem": null}}"#).unwrap();
        assert_eq!(no_item.into_level(), None);

        let no_levels: InventoryItemData = parse_graphql_response(
            200,
            None,
            r#"{"data": {"inventoryItem": {"inventoryLevels": {"edges": []}}}}"#,
        )
        .unwrap();
        assert_eq!(no_levels.into_level(), None);

        let no_available: InventoryItemData = parse_graphql_response(
            200,
            None,
            r#"{"data": {"inventoryItem": {"inventoryLevels": {"edges": [
                {"node": {"location": {"id": "gid://shopify/Location/7"}, "quantities": []}}
            ]}}}}"#,
        )
        .unwrap();
        assert_eq!(no_available.into_level(), None);
    }

    #[test]
    fn test_write_outcomes() {
        let applied: SetQuantitiesData = parse_graphql_response(
            200,
            None,
            r#"{"data": {"inventorySetQuantities": {"inventoryAdjustmentGroup": null, "userErrors": []}}}"#,
        )
        .unwrap();
        assert_eq!(applied.into_outcome().unwrap(), WriteOutcome::Applied);

        let rejected: SetQuantitiesData = parse_graphql_response(
            200,
            None,
            r#"{"data": {"inventorySetQuantities": {"userErrors": [
                {"field": ["input", "quantities", "0", "locationId"], "code": "NOT_STOCKED_AT_LOCATION",
                 "message": "The item is not stocked at the location."},
                {"field": null, "code": null, "message": "Something else"}
            ]}}}"#,
        )
        .unwrap();
        assert_eq!(
            rejected.into_outcome().unwrap(),
            WriteOutcome::Rejected {
                reason: "[NOT_STOCKED_AT_LOCATION] input.quantities.0.locationId: The item is not \
                         stocked at the location., [UNKNOWN] : Something else"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_variant_inventory_item() {
        let data: VariantData = parse_graphql_response(
            200,
            None,
            r#"{"data": {"productVariant": {"inventoryItem": {"id": "gid://shopify/InventoryItem/5"}}}}"#,
        )
        .unwrap();
        assert_eq!(
            data.into_inventory_item_id().as_deref(),
            Some("gid://shopify/InventoryItem/5")
        );

        let missing: VariantData =
            parse_graphql_response(200, None, r#"{"data": {"productVariant": null}}"#).unwrap();
        assert_eq!(missing.into_inventory_item_id(), None);
    }

    #[test]
    fn test_http_429_is_rate_limited() {
        let error = parse_graphql_response::<VariantData>(429, parse_retry_after("1.5"), "")
            .unwrap_err();
        assert_eq!(
            error,
            ClientError::RateLimited {
                retry_after: Some(Duration::from_millis(1500))
            }
        );

        let error = parse_graphql_response::<VariantData>(429, None, "").unwrap_err();
        assert_eq!(error, ClientError::RateLimited { retry_after: None });
    }

    #[test]
    fn test_throttled_graphql_error_is_rate_limited() {
        let body = r#"{"errors": [{"message": "Throttled", "extensions": {"code": "THROTTLED"}}]}"#;
        let error = parse_graphql_response::<VariantData>(200, None, body).unwrap_err();
        assert_eq!(error, ClientError::RateLimited { retry_after: None });
    }

    #[test]
    fn test_other_failures_are_terminal() {
        let body = r#"{"errors": [{"message": "Field 'x' doesn't exist"}, {"message": "bad"}]}"#;
        let error = parse_graphql_response::<VariantData>(200, None, body).unwrap_err();
        assert_eq!(error, ClientError::GraphQl("Field 'x' doesn't exist, bad".to_string()));

        let error =
            parse_graphql_response::<VariantData>(401, None, "[API] Invalid API key").unwrap_err();
        assert_eq!(error, ClientError::api(401, "[API] Invalid API key"));

        let error = parse_graphql_response::<VariantData>(200, None, "<html>").unwrap_err();
        assert!(matches!(error, ClientError::InvalidResponse(_)));

        let error = parse_graphql_response::<VariantData>(200, None, r#"{"data": null}"#).unwrap_err();
        assert!(matches!(error, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("NaN"), None);
        assert_eq!(parse_retry_after("inf"), None);
        assert_eq!(parse_retry_after("1e30"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
