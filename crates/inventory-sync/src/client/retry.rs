//! Bounded retry with exponential backoff for throttled backend calls.
//!
//! Throttling never reaches the engine: [`RetryingClient`] sleeps and re-issues
//! the identical call until the backend accepts it or the attempt budget is
//! spent, at which point the call fails with
//! [`ClientError::RateLimitExceeded`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::InventoryClient;
use crate::errors::{ClientError, RetryClass};
use crate::models::{InventoryLevel, VariantPage, VariantRecord, WriteOutcome};
use crate::sku::GroupKey;

/// Default number of attempts per call, the first one included.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Wait used when the backend throttles without suggesting a duration.
const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for a single wait.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Retry configuration for throttled calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, the first one included. Values below 1 count as 1.
    pub max_attempts: u32,
    /// Base wait when the backend gives no `Retry-After`.
    pub default_delay: Duration,
    /// Cap applied to every computed wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_delay: DEFAULT_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Wait before re-issuing a call that was throttled on `attempt` (1-based).
    ///
    /// The backend suggestion (or the default delay) doubles with every
    /// throttled attempt and is capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, suggested: Option<Duration>) -> Duration {
        let base = suggested.unwrap_or(self.default_delay);
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        base.checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `call` until it stops being throttled or the attempt budget is spent.
    ///
    /// Errors that are not throttling are returned as-is without retrying.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("[Retry] {} succeeded on attempt {}", operation, attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if error.retry_class() != RetryClass::AfterDelay {
                return Err(error);
            }

            if attempt >= max_attempts {
                warn!(
                    "[Retry] {} still throttled after {} attempts, giving up",
                    operation, attempt
                );
                return Err(ClientError::RateLimitExceeded { attempts: attempt });
            }

            let suggested = match error {
                ClientError::RateLimited { retry_after } => retry_after,
                _ => None,
            };
            let wait = self.delay_for(attempt, suggested);
            info!(
                "[Retry] {} throttled, waiting {:?} (attempt {}/{})",
                operation, wait, attempt, max_attempts
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// Wraps an [`InventoryClient`] so that every call is retried when throttled.
#[derive(Debug, Clone)]
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: InventoryClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: InventoryClient> InventoryClient for RetryingClient<C> {
    async fn search_by_group_prefix(
        &self,
        group: &GroupKey,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<VariantPage, ClientError> {
        self.policy
            .run("search_by_group_prefix", || {
                self.inner.search_by_group_prefix(group, page_size, cursor)
            })
            .await
    }

    async fn read_quantity(
        &self,
        inventory_item_id: &str,
    ) -> Result<Option<InventoryLevel>, ClientError> {
        self.policy
            .run("read_quantity", || self.inner.read_quantity(inventory_item_id))
            .await
    }

    async fn write_quantity(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        quantity: i64,
    ) -> Result<WriteOutcome, ClientError> {
        self.policy
            .run("write_quantity", || {
                self.inner
                    .write_quantity(inventory_item_id, location_id, quantity)
            })
            .await
    }

    async fn resolve_inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<String>, ClientError> {
        self.policy
            .run("resolve_inventory_item_id", || {
                self.inner.resolve_inventory_item_id(variant_id)
            })
            .await
    }

    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<VariantRecord>, ClientError> {
        self.policy
            .run("find_variant_by_sku", || self.inner.find_variant_by_sku(sku))
            .await
    }
}
