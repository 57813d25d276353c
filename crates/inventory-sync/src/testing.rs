//! In-memory [`InventoryClient`] for tests.
//!
//! Holds a catalog of variants with one inventory level each, counts every
//! call, and can be told to throttle, fail reads or searches, or reject
//! writes for specific inventory items.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::InventoryClient;
use crate::errors::ClientError;
use crate::models::{InventoryLevel, VariantPage, VariantRecord, WriteOutcome};
use crate::sku::GroupKey;

/// A write that reached the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub inventory_item_id: String,
    pub location_id: String,
    pub quantity: i64,
}

#[derive(Default)]
struct State {
    variants: Vec<VariantRecord>,
    levels: HashMap<String, InventoryLevel>,
    rejected_writes: HashMap<String, String>,
    broken_writes: HashSet<String>,
    read_error: Option<ClientError>,
    search_error: Option<ClientError>,
    throttle_remaining: u32,
    throttle_retry_after: Option<Duration>,
    search_calls: usize,
    read_calls: usize,
    resolve_calls: usize,
    lookup_calls: usize,
    writes: Vec<RecordedWrite>,
}

/// Mock inventory backend.
#[derive(Default)]
pub struct InMemoryInventory {
    state: Mutex<State>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a variant together with its inventory level.
    pub fn add_variant(
        &self,
        variant_id: &str,
        sku: &str,
        inventory_item_id: &str,
        quantity: i64,
        location_id: &str,
    ) {
        let mut state = self.state();
        state
            .variants
            .push(VariantRecord::new(variant_id, sku, inventory_item_id));
        state.levels.insert(
            inventory_item_id.to_string(),
            InventoryLevel {
                quantity,
                location_id: location_id.to_string(),
            },
        );
    }

    /// Add a variant that has no inventory level.
    pub fn add_variant_without_level(&self, variant_id: &str, sku: &str, inventory_item_id: &str) {
        self.state()
            .variants
            .push(VariantRecord::new(variant_id, sku, inventory_item_id));
    }

    pub fn set_quantity(&self, inventory_item_id: &str, quantity: i64) {
        if let Some(level) = self.state().levels.get_mut(inventory_item_id) {
            level.quantity = quantity;
        }
    }

    pub fn quantity_of(&self, inventory_item_id: &str) -> Option<i64> {
        self.state()
            .levels
            .get(inventory_item_id)
            .map(|level| level.quantity)
    }

    /// Writes to this item are answered with a `Rejected` outcome.
    pub fn reject_writes_for(&self, inventory_item_id: &str, reason: &str) {
        self.state()
            .rejected_writes
            .insert(inventory_item_id.to_string(), reason.to_string());
    }

    /// Writes to this item fail with a transport error.
    pub fn break_writes_for(&self, inventory_item_id: &str) {
        self.state()
            .broken_writes
            .insert(inventory_item_id.to_string());
    }

    pub fn fail_reads(&self, error: ClientError) {
        self.state().read_error = Some(error);
    }

    pub fn fail_searches(&self, error: ClientError) {
        self.state().search_error = Some(error);
    }

    /// The next `count` calls, of any kind, are throttled.
    pub fn throttle_next(&self, count: u32, retry_after: Option<Duration>) {
        let mut state = self.state();
        state.throttle_remaining = count;
        state.throttle_retry_after = retry_after;
    }

    pub fn search_calls(&self) -> usize {
        self.state().search_calls
    }

    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    pub fn resolve_calls(&self) -> usize {
        self.state().resolve_calls
    }

    pub fn lookup_calls(&self) -> usize {
        self.state().lookup_calls
    }

    pub fn write_calls(&self) -> usize {
        self.state().writes.len()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state().writes.clone()
    }
}

impl State {
    fn throttle(&mut self) -> Result<(), ClientError> {
        if self.throttle_remaining > 0 {
            self.throttle_remaining -= 1;
            return Err(ClientError::RateLimited {
                retry_after: self.throttle_retry_after,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventory {
    /// Matches loosely on the raw prefix, like a fuzzy backend search, so
    /// results include variants of other groups.
    async fn search_by_group_prefix(
        &self,
        group: &GroupKey,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<VariantPage, ClientError> {
        let mut state = self.state();
        state.search_calls += 1;
        state.throttle()?;
        if let Some(error) = state.search_error.clone() {
            return Err(error);
        }

        let matches: Vec<VariantRecord> = state
            .variants
            .iter()
            .filter(|v| {
                v.sku
                    .as_deref()
                    .is_some_and(|sku| sku.trim().to_uppercase().starts_with(group.as_str()))
            })
            .cloned()
            .collect();

        let offset = match cursor {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| ClientError::InvalidResponse(format!("bad cursor {}", cursor)))?,
            None => 0,
        };
        let page_size = page_size.max(1) as usize;
        let end = (offset + page_size).min(matches.len());
        let records = matches.get(offset..end).unwrap_or_default().to_vec();
        let has_next_page = end < matches.len();

        Ok(VariantPage {
            records,
            has_next_page,
            next_cursor: has_next_page.then(|| end.to_string()),
        })
    }

    async fn read_quantity(
        &self,
        inventory_item_id: &str,
    ) -> Result<Option<InventoryLevel>, ClientError> {
        let mut state = self.state();
        state.read_calls += 1;
        state.throttle()?;
        if let Some(error) = state.read_error.clone() {
            return Err(error);
        }
        Ok(state.levels.get(inventory_item_id).cloned())
    }

    async fn write_quantity(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        quantity: i64,
    ) -> Result<WriteOutcome, ClientError> {
        let mut state = self.state();
        state.throttle()?;
        state.writes.push(RecordedWrite {
            inventory_item_id: inventory_item_id.to_string(),
            location_id: location_id.to_string(),
            quantity,
        });

        if state.broken_writes.contains(inventory_item_id) {
            return Err(ClientError::transport("connection reset by peer"));
        }
        if let Some(reason) = state.rejected_writes.get(inventory_item_id) {
            return Ok(WriteOutcome::Rejected {
                reason: reason.clone(),
            });
        }

        state.levels.insert(
            inventory_item_id.to_string(),
            InventoryLevel {
                quantity,
                location_id: location_id.to_string(),
            },
        );
        Ok(WriteOutcome::Applied)
    }

    async fn resolve_inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<String>, ClientError> {
        let mut state = self.state();
        state.resolve_calls += 1;
        state.throttle()?;
        Ok(state
            .variants
            .iter()
            .find(|v| v.variant_id == variant_id)
            .map(|v| v.inventory_item_id.clone()))
    }

    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<VariantRecord>, ClientError> {
        let mut state = self.state();
        state.lookup_calls += 1;
        state.throttle()?;
        Ok(state
            .variants
            .iter()
            .find(|v| v.sku.as_deref() == Some(sku))
            .cloned())
    }
}
