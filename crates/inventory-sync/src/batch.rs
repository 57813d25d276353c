//! Batch processing of the candidates of one inbound event.
//!
//! At most one group sync runs per group: the first candidate of a group
//! propagates its quantity to every sibling, which makes later candidates of
//! the same group redundant.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::errors::SyncFailure;
use crate::models::{BatchResult, SyncCandidate, SyncResult};
use crate::orchestrator::{InvalidSkuPolicy, SyncOrchestrator};
use crate::sku::GroupKey;

/// Deduplicates candidates by group and runs one sync per group.
pub struct BatchProcessor<'a> {
    orchestrator: &'a SyncOrchestrator,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(orchestrator: &'a SyncOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Process candidates in input order, one group at a time.
    pub async fn process(&self, candidates: &[SyncCandidate]) -> BatchResult {
        let policy = self.orchestrator.config().invalid_sku_policy;
        let mut seen: HashSet<GroupKey> = HashSet::new();
        let mut results = Vec::new();

        for candidate in candidates {
            let Some(group) = GroupKey::derive(&candidate.sku) else {
                match policy {
                    InvalidSkuPolicy::Record => {
                        warn!("[Batch] Invalid SKU: \"{}\"", candidate.sku);
                        results.push(SyncResult::invalid_sku(&candidate.sku));
                    }
                    InvalidSkuPolicy::Skip => {
                        debug!("[Batch] Skipping invalid SKU: \"{}\"", candidate.sku);
                    }
                }
                continue;
            };

            if !seen.insert(group.clone()) {
                debug!(
                    "[Batch] {} already synced in this batch, skipping {}",
                    group, candidate.sku
                );
                continue;
            }

            let inventory_item_id = match self.inventory_item_id(candidate).await {
                Ok(id) => id,
                Err(failure) => {
                    warn!("[Batch] {}: {}", candidate.sku, failure);
                    results.push(SyncResult::aborted(group.as_str(), &candidate.sku, failure));
                    continue;
                }
            };

            results.push(
                self.orchestrator
                    .sync_group(&candidate.sku, &inventory_item_id)
                    .await,
            );
        }

        let batch = BatchResult::new(results);
        info!(
            "[Batch] {} groups, {} variants updated ({})",
            batch.results.len(),
            batch.total_updated(),
            batch.status
        );
        batch
    }

    /// The candidate's inventory item, resolved from its variant when absent.
    async fn inventory_item_id(&self, candidate: &SyncCandidate) -> Result<String, SyncFailure> {
        if let Some(id) = candidate.inventory_item_id.as_deref().filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }

        let not_found = || SyncFailure::LookupNotFound {
            variant_id: candidate
                .variant_id
                .clone()
                .unwrap_or_else(|| "<none>".to_string()),
        };

        let Some(variant_id) = candidate.variant_id.as_deref() else {
            return Err(not_found());
        };

        match self
            .orchestrator
            .client()
            .resolve_inventory_item_id(variant_id)
            .await
        {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(not_found()),
            Err(e) => {
                warn!("[Batch] Inventory item lookup for {} failed: {}", variant_id, e);
                Err(not_found())
            }
        }
    }
}
