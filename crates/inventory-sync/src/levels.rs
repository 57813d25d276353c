//! Inventory level reader/writer.

use log::{debug, error};

use crate::client::InventoryClient;
use crate::errors::ClientError;
use crate::models::{InventoryLevel, WriteOutcome};

/// Reads and writes the available quantity of single inventory items.
pub struct InventoryLevels<'a> {
    client: &'a dyn InventoryClient,
}

impl<'a> InventoryLevels<'a> {
    pub fn new(client: &'a dyn InventoryClient) -> Self {
        Self { client }
    }

    /// Current level of an item, `None` when the backend has none.
    pub async fn read(&self, inventory_item_id: &str) -> Result<Option<InventoryLevel>, ClientError> {
        self.client.read_quantity(inventory_item_id).await
    }

    /// Set the available quantity of an item.
    ///
    /// A rejected write and a failed request are both reported as `Err(reason)`.
    pub async fn write(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        quantity: i64,
    ) -> Result<(), String> {
        match self
            .client
            .write_quantity(inventory_item_id, location_id, quantity)
            .await
        {
            Ok(WriteOutcome::Applied) => {
                debug!("[Levels] {} set to {} at {}", inventory_item_id, quantity, location_id);
                Ok(())
            }
            Ok(WriteOutcome::Rejected { reason }) => {
                error!("[Levels] Set inventory error for {}: {}", inventory_item_id, reason);
                Err(reason)
            }
            Err(e) => {
                error!("[Levels] Set inventory request for {} failed: {}", inventory_item_id, e);
                Err(e.to_string())
            }
        }
    }
}
