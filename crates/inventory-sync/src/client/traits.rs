//! Remote inventory backend contract.

use async_trait::async_trait;

use crate::errors::ClientError;
use crate::models::{InventoryLevel, VariantPage, VariantRecord, WriteOutcome};
use crate::sku::GroupKey;

/// Trait for the catalog/inventory backend.
///
/// Implementations translate each call into one backend request and report
/// throttling as [`ClientError::RateLimited`]. Retrying is not their concern;
/// wrap them in a [`RetryingClient`](super::RetryingClient).
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Search variants whose SKU starts with `{group}-`.
    ///
    /// This is a prefix search: the page may contain variants of other groups.
    async fn search_by_group_prefix(
        &self,
        group: &GroupKey,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<VariantPage, ClientError>;

    /// Read the available quantity and location of an inventory item.
    ///
    /// `Ok(None)` when the item or its level does not exist.
    async fn read_quantity(
        &self,
        inventory_item_id: &str,
    ) -> Result<Option<InventoryLevel>, ClientError>;

    /// Overwrite the available quantity of an inventory item at a location.
    ///
    /// Unconditional: no compare against the current value.
    async fn write_quantity(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        quantity: i64,
    ) -> Result<WriteOutcome, ClientError>;

    /// Look up the inventory item behind a variant.
    async fn resolve_inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<String>, ClientError>;

    /// Point lookup of a single variant by exact SKU.
    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<VariantRecord>, ClientError>;
}

#[async_trait]
impl<T: InventoryClient + ?Sized> InventoryClient for std::sync::Arc<T> {
    async fn search_by_group_prefix(
        &self,
        group: &GroupKey,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<VariantPage, ClientError> {
        (**self).search_by_group_prefix(group, page_size, cursor).await
    }

    async fn read_quantity(
        &self,
        inventory_item_id: &str,
    ) -> Result<Option<InventoryLevel>, ClientError> {
        (**self).read_quantity(inventory_item_id).await
    }

    async fn write_quantity(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        quantity: i64,
    ) -> Result<WriteOutcome, ClientError> {
        (**self)
            .write_quantity(inventory_item_id, location_id, quantity)
            .await
    }

    async fn resolve_inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<String>, ClientError> {
        (**self).resolve_inventory_item_id(variant_id).await
    }

    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<VariantRecord>, ClientError> {
        (**self).find_variant_by_sku(sku).await
    }
}
