//! VariantSync Inventory Crate
//!
//! Keeps the available quantity of sibling product variants in step. Variants
//! belong to the same family when their SKUs share a group prefix
//! (`BXAAA-1`, `BXAAA-2`, ...). When one of them changes, its quantity is
//! read once and written to every other member of the group.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   StoreEvent     |  (order paid / cancelled, refund created)
//! +------------------+
//!          |  candidates
//!          v
//! +------------------+
//! |  BatchProcessor  |  (one sync per group, first candidate wins)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | SyncOrchestrator | --> |  find_siblings   |  (paged prefix search)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! | RetryingClient   |  (bounded backoff on throttling)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | InventoryClient  |  (Shopify, in-memory fake, ...)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`GroupKey`] - Canonical group derived from a SKU
//! - [`SyncCandidate`] - A variant whose stock changed
//! - [`SyncResult`] - Outcome of one group sync, errors included
//! - [`BatchResult`] - Results of one event plus an overall status

pub mod batch;
pub mod client;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod levels;
pub mod models;
pub mod orchestrator;
pub mod sku;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use batch::BatchProcessor;
pub use client::{InventoryClient, RetryPolicy, RetryingClient};
pub use errors::{ClientError, RetryClass, SyncFailure, TriggerError};
pub use events::{StoreEvent, Trigger};
pub use models::{
    BatchResult, BatchStatus, InventoryLevel, SyncCandidate, SyncResult, VariantPage,
    VariantRecord, WriteOutcome,
};
pub use orchestrator::{InvalidSkuPolicy, SyncConfig, SyncOrchestrator};
pub use sku::{derive_group_key, GroupKey};
