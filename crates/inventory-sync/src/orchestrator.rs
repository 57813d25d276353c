//! Group synchronization.
//!
//! Reads the triggering variant's quantity once, discovers its siblings and
//! writes that quantity to every sibling, one at a time. Every failure ends
//! up in the returned [`SyncResult`]; nothing is propagated.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use crate::client::InventoryClient;
use crate::discovery::{find_siblings, DEFAULT_PAGE_DELAY, DEFAULT_PAGE_SIZE};
use crate::errors::{SyncFailure, TriggerError};
use crate::levels::InventoryLevels;
use crate::models::SyncResult;
use crate::sku::GroupKey;

/// Pause after every sibling write.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(200);

/// What the batch processor does with candidates whose SKU has no group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidSkuPolicy {
    /// Report an `Invalid SKU format` result for the candidate.
    #[default]
    Record,
    /// Drop the candidate without a result.
    Skip,
}

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Variants requested per discovery page.
    pub page_size: u32,
    /// Pause between discovery pages.
    pub page_delay: Duration,
    /// Pause after each sibling write.
    pub write_delay: Duration,
    pub invalid_sku_policy: InvalidSkuPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
            write_delay: DEFAULT_WRITE_DELAY,
            invalid_sku_policy: InvalidSkuPolicy::Record,
        }
    }
}

impl SyncConfig {
    /// No pacing at all. Meant for tests and backends without burst limits.
    pub fn unpaced() -> Self {
        Self {
            page_delay: Duration::ZERO,
            write_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Orchestrates the synchronization of sibling variants.
///
/// # Example
///
/// ```ignore
/// let client = RetryingClient::new(shopify_client, RetryPolicy::default());
/// let orchestrator = SyncOrchestrator::new(Arc::new(client), SyncConfig::default());
/// let result = orchestrator.sync_group("BXAAA-1", "gid://shopify/InventoryItem/1").await;
/// ```
pub struct SyncOrchestrator {
    client: Arc<dyn InventoryClient>,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(client: Arc<dyn InventoryClient>, config: SyncConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn client(&self) -> &dyn InventoryClient {
        self.client.as_ref()
    }

    /// Propagate the source variant's quantity to all of its siblings.
    pub async fn sync_group(&self, source_sku: &str, source_inventory_item_id: &str) -> SyncResult {
        let Some(group) = GroupKey::derive(source_sku) else {
            warn!("[Sync] Invalid SKU format: \"{}\"", source_sku);
            return SyncResult::invalid_sku(source_sku);
        };

        info!(
            "[Sync] Starting sync for group {} (triggered by {})",
            group, source_sku
        );

        // 1. Source of truth for this sync
        let levels = InventoryLevels::new(self.client.as_ref());
        let level = match levels.read(source_inventory_item_id).await {
            Ok(Some(level)) => level,
            Ok(None) => {
                warn!("[Sync] {}: no inventory level for {}", group, source_sku);
                let failure = SyncFailure::SourceNotFound {
                    sku: source_sku.to_string(),
                };
                return SyncResult::aborted(group.as_str(), source_sku, failure);
            }
            Err(e) => {
                error!("[Sync] {}: reading {} failed: {}", group, source_sku, e);
                let failure = SyncFailure::SourceReadFailed {
                    sku: source_sku.to_string(),
                    reason: e.to_string(),
                };
                return SyncResult::aborted(group.as_str(), source_sku, failure);
            }
        };
        info!(
            "[Sync] {}: current quantity = {} at {}",
            group, level.quantity, level.location_id
        );

        // 2. Every variant of the group, the source included
        let siblings = match find_siblings(
            self.client.as_ref(),
            &group,
            self.config.page_size,
            self.config.page_delay,
        )
        .await
        {
            Ok(siblings) => siblings,
            Err(e) => {
                error!("[Sync] {}: sibling discovery failed: {}", group, e);
                let failure = SyncFailure::DiscoveryFailed {
                    group: group.to_string(),
                    reason: e.to_string(),
                };
                let mut result = SyncResult::aborted(group.as_str(), source_sku, failure);
                result.quantity = level.quantity;
                return result;
            }
        };
        info!("[Sync] {}: found {} siblings", group, siblings.len());

        // 3. Write the quantity to every other variant, sequentially
        let mut errors = Vec::new();
        let mut updated = 0usize;

        for sibling in &siblings {
            if sibling.inventory_item_id == source_inventory_item_id {
                continue;
            }

            let sku = sibling.sku_or_empty();
            info!(
                "[Sync] Setting {} ({}) to {}",
                sku, sibling.inventory_item_id, level.quantity
            );

            match levels
                .write(&sibling.inventory_item_id, &level.location_id, level.quantity)
                .await
            {
                Ok(()) => updated += 1,
                Err(reason) => {
                    warn!("[Sync] {} failed: {}", sku, reason);
                    errors.push(
                        SyncFailure::SiblingWrite {
                            sku: sku.to_string(),
                            reason,
                        }
                        .to_string(),
                    );
                }
            }

            tokio::time::sleep(self.config.write_delay).await;
        }

        info!(
            "[Sync] {}: updated {}/{} siblings to quantity {}{}",
            group,
            updated,
            siblings.len().saturating_sub(1),
            level.quantity,
            if errors.is_empty() {
                String::new()
            } else {
                format!(" ({} errors)", errors.len())
            }
        );

        SyncResult {
            group_key: group.to_string(),
            source_sku: source_sku.to_string(),
            quantity: level.quantity,
            siblings_found: siblings.len(),
            siblings_updated: updated,
            errors,
        }
    }

    /// Manual trigger: look the variant up by SKU and sync its group.
    pub async fn sync_sku(&self, sku: &str) -> Result<SyncResult, TriggerError> {
        let sku = sku.trim();
        if GroupKey::derive(sku).is_none() {
            return Err(TriggerError::InvalidSku(sku.to_string()));
        }

        let variant = self
            .client
            .find_variant_by_sku(sku)
            .await?
            .ok_or_else(|| TriggerError::VariantNotFound(sku.to_string()))?;

        info!(
            "[Sync] Manual trigger for {} ({})",
            sku, variant.inventory_item_id
        );
        Ok(self.sync_group(sku, &variant.inventory_item_id).await)
    }
}
