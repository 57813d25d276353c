//! Inbound store events.
//!
//! Turns the JSON bodies of the `orders/paid`, `orders/cancelled` and
//! `refunds/create` webhooks into [`SyncCandidate`]s. Only the fields the
//! engine needs are modelled; everything else in the payload is ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SyncCandidate;
use crate::sku::GroupKey;

const VARIANT_GID_PREFIX: &str = "gid://shopify/ProductVariant/";
const INVENTORY_ITEM_GID_PREFIX: &str = "gid://shopify/InventoryItem/";

/// The store event that triggered a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trigger {
    #[serde(rename = "orders/paid")]
    OrderPaid,
    #[serde(rename = "orders/cancelled")]
    OrderCancelled,
    #[serde(rename = "refunds/create")]
    RefundCreated,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [
        Trigger::OrderPaid,
        Trigger::OrderCancelled,
        Trigger::RefundCreated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::OrderPaid => "orders/paid",
            Trigger::OrderCancelled => "orders/cancelled",
            Trigger::RefundCreated => "refunds/create",
        }
    }

    /// Admin API subscription topic, e.g. `ORDERS_PAID`.
    pub fn topic(&self) -> &'static str {
        match self {
            Trigger::OrderPaid => "ORDERS_PAID",
            Trigger::OrderCancelled => "ORDERS_CANCELLED",
            Trigger::RefundCreated => "REFUNDS_CREATE",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric or string identifier as found in webhook bodies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    /// Global id under `prefix`, unless the id already is one.
    fn to_gid(&self, prefix: &str) -> Option<String> {
        match self {
            RawId::Number(n) => Some(format!("{}{}", prefix, n)),
            RawId::Text(s) if s.trim().is_empty() => None,
            RawId::Text(s) if s.starts_with("gid://") => Some(s.clone()),
            RawId::Text(s) => Some(format!("{}{}", prefix, s.trim())),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

/// A line item of an order, or the line item inside a refund line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub variant_id: Option<RawId>,
    #[serde(default)]
    pub inventory_item_id: Option<RawId>,
}

impl LineItem {
    fn candidate(&self) -> Option<SyncCandidate> {
        let sku = self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(SyncCandidate {
            sku: sku.to_string(),
            variant_id: self
                .variant_id
                .as_ref()
                .and_then(|id| id.to_gid(VARIANT_GID_PREFIX)),
            inventory_item_id: self
                .inventory_item_id
                .as_ref()
                .and_then(|id| id.to_gid(INVENTORY_ITEM_GID_PREFIX)),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundLine {
    #[serde(default)]
    pub line_item: Option<LineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundPayload {
    #[serde(default)]
    pub order_id: Option<RawId>,
    #[serde(default)]
    pub refund_line_items: Vec<RefundLine>,
}

/// A parsed webhook, ready for the batch processor.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub trigger: Trigger,
    /// Human readable order reference, e.g. `#1001`.
    pub order: String,
    pub candidates: Vec<SyncCandidate>,
}

impl StoreEvent {
    /// Parse a raw webhook body for the given trigger.
    pub fn parse(trigger: Trigger, body: &[u8]) -> Result<Self, serde_json::Error> {
        match trigger {
            Trigger::OrderPaid | Trigger::OrderCancelled => {
                let order: OrderPayload = serde_json::from_slice(body)?;
                Ok(Self::from_order(trigger, order))
            }
            Trigger::RefundCreated => {
                let refund: RefundPayload = serde_json::from_slice(body)?;
                Ok(Self::from_refund(refund))
            }
        }
    }

    pub fn from_order(trigger: Trigger, order: OrderPayload) -> Self {
        let label = match (order.name.as_deref().filter(|n| !n.is_empty()), &order.id) {
            (Some(name), _) => name.to_string(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => "#unknown".to_string(),
        };
        Self {
            trigger,
            order: label,
            candidates: order.line_items.iter().filter_map(LineItem::candidate).collect(),
        }
    }

    /// Refunds without restock still yield candidates; their sync reads an
    /// unchanged quantity and rewrites it.
    pub fn from_refund(refund: RefundPayload) -> Self {
        Self {
            trigger: Trigger::RefundCreated,
            order: refund
                .order_id
                .as_ref()
                .map(|id| format!("#{}", id))
                .unwrap_or_else(|| "#unknown".to_string()),
            candidates: refund
                .refund_line_items
                .iter()
                .filter_map(|line| line.line_item.as_ref())
                .filter_map(LineItem::candidate)
                .collect(),
        }
    }

    /// Whether at least one candidate carries a SKU with a group.
    pub fn has_valid_sku(&self) -> bool {
        self.candidates
            .iter()
            .any(|c| GroupKey::derive(&c.sku).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_line_items_become_candidates() {
        let body = br##"{
            "id": 5501,
            "name": "#1001",
            "currency": "EUR",
            "line_items": [
                {"sku": "BXAAA-1", "variant_id": 111, "inventory_item_id": 222, "quantity": 1},
                {"sku": "", "variant_id": 112},
                {"variant_id": 113},
                {"sku": "BXAAD-2", "variant_id": 114, "inventory_item_id": null}
            ]
        }"##;

        let event = StoreEvent::parse(Trigger::OrderPaid, body).unwrap();

        assert_eq!(event.order, "#1001");
        assert_eq!(event.candidates.len(), 2);
        assert_eq!(
            event.candidates[0],
            SyncCandidate::new("BXAAA-1")
                .with_variant_id("gid://shopify/ProductVariant/111")
                .with_inventory_item_id("gid://shopify/InventoryItem/222")
        );
        assert_eq!(
            event.candidates[1],
            SyncCandidate::new("BXAAD-2").with_variant_id("gid://shopify/ProductVariant/114")
        );
    }

    #[test]
    fn test_order_label_falls_back_to_id() {
        let event = StoreEvent::parse(Trigger::OrderCancelled, br#"{"id": 42}"#).unwrap();
        assert_eq!(event.order, "#42");
        assert!(event.candidates.is_empty());
        assert_eq!(event.trigger.to_string(), "orders/cancelled");
    }

    #[test]
    fn test_trigger_names() {
        let names: Vec<_> = Trigger::ALL.iter().map(|t| (t.as_str(), t.topic())).collect();
        assert_eq!(
            names,
            vec![
                ("orders/paid", "ORDERS_PAID"),
                ("orders/cancelled", "ORDERS_CANCELLED"),
                ("refunds/create", "REFUNDS_CREATE"),
            ]
        );
        assert_eq!(
            serde_json::to_value(Trigger::RefundCreated).unwrap(),
            serde_json::json!("refunds/create")
        );
    }

    #[test]
    fn test_refund_line_items() {
        let body = br#"{
            "id": 9,
            "order_id": 5501,
            "refund_line_items": [
                {"quantity": 1, "restock_type": "return", "line_item": {"sku": "BXAAA-2", "variant_id": 111}},
                {"quantity": 1, "line_item": null},
                {"quantity": 1}
            ]
        }"#;

        let event = StoreEvent::parse(Trigger::RefundCreated, body).unwrap();

        assert_eq!(event.order, "#5501");
        assert_eq!(event.trigger, Trigger::RefundCreated);
        assert_eq!(
            event.candidates,
            vec![SyncCandidate::new("BXAAA-2").with_variant_id("gid://shopify/ProductVariant/111")]
        );
    }

    #[test]
    fn test_string_ids_and_existing_gids() {
        let body = br#"{"line_items": [
            {"sku": "BXAAA-1", "variant_id": "gid://shopify/ProductVariant/7", "inventory_item_id": "8"}
        ]}"#;

        let event = StoreEvent::parse(Trigger::OrderPaid, body).unwrap();

        assert_eq!(
            event.candidates[0].variant_id.as_deref(),
            Some("gid://shopify/ProductVariant/7")
        );
        assert_eq!(
            event.candidates[0].inventory_item_id.as_deref(),
            Some("gid://shopify/InventoryItem/8")
        );
        assert_eq!(event.order, "#unknown");
    }

    #[test]
    fn test_has_valid_sku() {
        let body = br#"{"id": 1, "line_items": [{"sku": "NODASH"}, {"sku": "BXAAA-X"}]}"#;
        let event = StoreEvent::parse(Trigger::OrderPaid, body).unwrap();
        assert_eq!(event.candidates.len(), 2);
        assert!(!event.has_valid_sku());

        let body = br#"{"id": 1, "line_items": [{"sku": "NODASH"}, {"sku": "bxaaa-3"}]}"#;
        let event = StoreEvent::parse(Trigger::OrderPaid, body).unwrap();
        assert!(event.has_valid_sku());
    }

    #[test]
    fn test_unparsable_body() {
        assert!(StoreEvent::parse(Trigger::OrderPaid, b"not json").is_err());
        assert!(StoreEvent::parse(Trigger::RefundCreated, br#"{"refund_line_items": 3}"#).is_err());
    }
}
