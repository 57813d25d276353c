//! Data exchanged between the engine, the remote inventory backend and callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SyncFailure;
use crate::sku::UNKNOWN_GROUP;

// ─────────────────────────────────────────────────────────────────────────────
// Backend records
// ─────────────────────────────────────────────────────────────────────────────

/// A product variant as returned by the catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub variant_id: String,
    /// Variants without a SKU are returned by some backends; they never match a group.
    pub sku: Option<String>,
    pub inventory_item_id: String,
}

impl VariantRecord {
    pub fn new(
        variant_id: impl Into<String>,
        sku: impl Into<String>,
        inventory_item_id: impl Into<String>,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            sku: Some(sku.into()),
            inventory_item_id: inventory_item_id.into(),
        }
    }

    pub fn sku_or_empty(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }
}

/// One page of a catalog search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantPage {
    pub records: Vec<VariantRecord>,
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

/// Available quantity of an inventory item at its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLevel {
    /// May be negative when the backend allows overselling.
    pub quantity: i64,
    pub location_id: String,
}

/// Result of an unconditional quantity write that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The backend answered but refused the write (validation errors etc.).
    Rejected { reason: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Triggers
// ─────────────────────────────────────────────────────────────────────────────

/// A variant whose stock changed, extracted from an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCandidate {
    pub sku: String,
    /// Used to resolve the inventory item when the event did not carry it.
    pub variant_id: Option<String>,
    pub inventory_item_id: Option<String>,
}

impl SyncCandidate {
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            variant_id: None,
            inventory_item_id: None,
        }
    }

    pub fn with_variant_id(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_inventory_item_id(mut self, inventory_item_id: impl Into<String>) -> Self {
        self.inventory_item_id = Some(inventory_item_id.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of synchronizing one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// The derived group, or `UNKNOWN` when the source SKU carries none.
    pub group_key: String,
    pub source_sku: String,
    pub quantity: i64,
    /// Every variant discovered for the group, the source included.
    pub siblings_found: usize,
    pub siblings_updated: usize,
    pub errors: Vec<String>,
}

impl SyncResult {
    /// A result that stopped before any sibling was written.
    pub fn aborted(
        group_key: impl Into<String>,
        source_sku: impl Into<String>,
        failure: SyncFailure,
    ) -> Self {
        Self {
            group_key: group_key.into(),
            source_sku: source_sku.into(),
            quantity: 0,
            siblings_found: 0,
            siblings_updated: 0,
            errors: vec![failure.to_string()],
        }
    }

    /// A result for a SKU that has no group.
    pub fn invalid_sku(source_sku: impl Into<String>) -> Self {
        let source_sku = source_sku.into();
        let failure = SyncFailure::InvalidSku {
            sku: source_sku.clone(),
        };
        Self::aborted(UNKNOWN_GROUP, source_sku, failure)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Overall status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ok,
    Partial,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Ok => write!(f, "ok"),
            BatchStatus::Partial => write!(f, "partial"),
        }
    }
}

/// Results of one inbound event, one entry per distinct group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub results: Vec<SyncResult>,
}

impl BatchResult {
    pub fn new(results: Vec<SyncResult>) -> Self {
        let status = if results.iter().any(SyncResult::has_errors) {
            BatchStatus::Partial
        } else {
            BatchStatus::Ok
        };
        Self { status, results }
    }

    pub fn total_updated(&self) -> usize {
        self.results.iter().map(|r| r.siblings_updated).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(errors: Vec<&str>) -> SyncResult {
        SyncResult {
            group_key: "BXAAA".to_string(),
            source_sku: "BXAAA-1".to_string(),
            quantity: 3,
            siblings_found: 4,
            siblings_updated: 3 - errors.len().min(3),
            errors: errors.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_batch_status_ok_without_errors() {
        let batch = BatchResult::new(vec![result(vec![]), result(vec![])]);
        assert_eq!(batch.status, BatchStatus::Ok);
        assert_eq!(batch.total_updated(), 6);
    }

    #[test]
    fn test_batch_status_partial_with_any_error() {
        let batch = BatchResult::new(vec![result(vec![]), result(vec!["BXAAA-2: boom"])]);
        assert_eq!(batch.status, BatchStatus::Partial);
    }

    #[test]
    fn test_empty_batch_is_ok() {
        let batch = BatchResult::new(vec![]);
        assert_eq!(batch.status, BatchStatus::Ok);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_invalid_sku_result() {
        let result = SyncResult::invalid_sku("NODASH");
        assert_eq!(result.group_key, "UNKNOWN");
        assert_eq!(result.errors, vec!["Invalid SKU format: \"NODASH\"".to_string()]);
        assert_eq!(result.siblings_found, 0);
    }

    #[test]
    fn test_sync_result_serializes_camel_case() {
        let json = serde_json::to_value(result(vec![])).unwrap();
        assert_eq!(json["groupKey"], "BXAAA");
        assert_eq!(json["sourceSku"], "BXAAA-1");
        assert_eq!(json["siblingsFound"], 4);
        assert_eq!(json["siblingsUpdated"], 3);
    }

    #[test]
    fn test_batch_status_serializes_lowercase() {
        let json = serde_json::to_value(BatchResult::new(vec![])).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
