//! Error types for the inventory sync engine.
//!
//! - [`ClientError`]: failures of a remote inventory call, classified by
//!   [`RetryClass`]
//! - [`SyncFailure`]: failures recorded in a [`SyncResult`](crate::SyncResult)
//!   instead of being propagated
//! - [`TriggerError`]: failures of the manual single-SKU trigger

mod retry;

pub use retry::RetryClass;

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the remote inventory backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The backend throttled the request (HTTP 429 or an in-band "throttled" error).
    /// Retried transparently by the retrying client.
    #[error("Rate limited")]
    RateLimited {
        /// Wait suggested by the backend, if any.
        retry_after: Option<Duration>,
    },

    /// The backend kept throttling until the retry budget was spent.
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// The request never produced an HTTP response (DNS, TLS, timeout...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered with top-level GraphQL errors.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Returns the retry classification for this error.
    ///
    /// ```
    /// use variantsync_inventory::errors::{ClientError, RetryClass};
    ///
    /// let error = ClientError::RateLimited { retry_after: None };
    /// assert_eq!(error.retry_class(), RetryClass::AfterDelay);
    ///
    /// let error = ClientError::api(500, "boom");
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } => RetryClass::AfterDelay,
            Self::RateLimitExceeded { .. }
            | Self::Transport(_)
            | Self::Api { .. }
            | Self::GraphQl(_)
            | Self::InvalidResponse(_) => RetryClass::Never,
        }
    }
}

/// A failure recorded as a string in a sync result.
///
/// The `Display` output is the exact message reported to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    #[error("Invalid SKU format: \"{sku}\"")]
    InvalidSku { sku: String },

    #[error("Could not find inventoryItemId for variant {variant_id}")]
    LookupNotFound { variant_id: String },

    #[error("Could not read inventory for {sku}")]
    SourceNotFound { sku: String },

    #[error("Could not read inventory for {sku}: {reason}")]
    SourceReadFailed { sku: String, reason: String },

    #[error("Sibling discovery failed for {group}: {reason}")]
    DiscoveryFailed { group: String, reason: String },

    #[error("{sku}: {reason}")]
    SiblingWrite { sku: String, reason: String },
}

/// Errors of the manual single-SKU trigger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Invalid SKU format: \"{0}\". Expected format: BXAAA-1")]
    InvalidSku(String),

    #[error("Variant with SKU \"{0}\" not found")]
    VariantNotFound(String),

    #[error("Variant lookup failed: {0}")]
    Lookup(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_after_delay() {
        let error = ClientError::RateLimited {
            retry_after: Some(Duration::from_secs(1)),
        };
        assert_eq!(error.retry_class(), RetryClass::AfterDelay);
    }

    #[test]
    fn test_exhausted_rate_limit_never_retries() {
        let error = ClientError::RateLimitExceeded { attempts: 5 };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_other_errors_never_retry() {
        assert_eq!(
            ClientError::transport("connection reset").retry_class(),
            RetryClass::Never
        );
        assert_eq!(ClientError::api(502, "bad gateway").retry_class(), RetryClass::Never);
        assert_eq!(
            ClientError::GraphQl("Field 'x' doesn't exist".into()).retry_class(),
            RetryClass::Never
        );
    }

    #[test]
    fn test_failure_messages() {
        let failure = SyncFailure::SiblingWrite {
            sku: "BXAAA-2".into(),
            reason: "[INVALID] quantity: must be set".into(),
        };
        assert_eq!(failure.to_string(), "BXAAA-2: [INVALID] quantity: must be set");

        let failure = SyncFailure::SourceNotFound {
            sku: "BXAAA-1".into(),
        };
        assert_eq!(failure.to_string(), "Could not read inventory for BXAAA-1");

        let failure = SyncFailure::LookupNotFound {
            variant_id: "gid://shopify/ProductVariant/7".into(),
        };
        assert_eq!(
            failure.to_string(),
            "Could not find inventoryItemId for variant gid://shopify/ProductVariant/7"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClientError::RateLimitExceeded { attempts: 3 }.to_string(),
            "Rate limit exceeded after 3 attempts"
        );
        assert_eq!(
            ClientError::api(401, "Invalid API key").to_string(),
            "API error (401): Invalid API key"
        );
    }
}
