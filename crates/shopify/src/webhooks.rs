//! Webhook subscription management.
//!
//! Used by the registration tool, not by the sync engine.

use serde::Deserialize;
use serde_json::{json, Value};
use variantsync_inventory::ClientError;

use crate::client::ShopifyClient;
use crate::models::{Connection, UserError};
use crate::queries;

/// Subscriptions fetched per listing.
const LIST_PAGE_SIZE: u32 = 50;

/// An existing webhook subscription of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSubscription {
    pub id: String,
    /// Admin API topic, e.g. `ORDERS_PAID`.
    pub topic: String,
    /// `None` for non-HTTP endpoints such as EventBridge.
    pub callback_url: Option<String>,
}

/// Result of a subscription mutation that Shopify may refuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    Done { id: String },
    Rejected { reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListData {
    webhook_subscriptions: Connection<SubscriptionNode>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionNode {
    id: String,
    topic: String,
    #[serde(default)]
    endpoint: Option<EndpointNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointNode {
    #[serde(default)]
    callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteData {
    webhook_subscription_delete: Option<DeletePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletePayload {
    deleted_webhook_subscription_id: Option<String>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    webhook_subscription_create: Option<CreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePayload {
    webhook_subscription: Option<IdOnly>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

impl ListData {
    fn into_subscriptions(self) -> Vec<WebhookSubscription> {
        self.webhook_subscriptions
            .edges
            .into_iter()
            .map(|edge| WebhookSubscription {
                id: edge.node.id,
                topic: edge.node.topic,
                callback_url: edge.node.endpoint.and_then(|e| e.callback_url),
            })
            .collect()
    }
}

fn outcome(
    operation: &str,
    id: Option<String>,
    user_errors: &[UserError],
) -> Result<SubscriptionOutcome, ClientError> {
    if !user_errors.is_empty() {
        let reason = user_errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Ok(SubscriptionOutcome::Rejected { reason });
    }
    id.map(|id| SubscriptionOutcome::Done { id }).ok_or_else(|| {
        ClientError::InvalidResponse(format!("{} returned no subscription id", operation))
    })
}

impl DeleteData {
    fn into_outcome(self) -> Result<SubscriptionOutcome, ClientError> {
        let payload = self.webhook_subscription_delete.ok_or_else(|| {
            ClientError::InvalidResponse("webhookSubscriptionDelete returned no payload".into())
        })?;
        outcome(
            "webhookSubscriptionDelete",
            payload.deleted_webhook_subscription_id,
            &payload.user_errors,
        )
    }
}

impl CreateData {
    fn into_outcome(self) -> Result<SubscriptionOutcome, ClientError> {
        let payload = self.webhook_subscription_create.ok_or_else(|| {
            ClientError::InvalidResponse("webhookSubscriptionCreate returned no payload".into())
        })?;
        outcome(
            "webhookSubscriptionCreate",
            payload.webhook_subscription.map(|s| s.id),
            &payload.user_errors,
        )
    }
}

/// Variables of the `webhookSubscriptionCreate` mutation.
pub(crate) fn create_variables(topic: &str, callback_url: &str) -> Value {
    json!({
        "topic": topic,
        "webhookSubscription": {
            "callbackUrl": callback_url,
            "format": "JSON",
        },
    })
}

impl ShopifyClient {
    /// The store's webhook subscriptions (first page only).
    pub async fn list_webhook_subscriptions(&self) -> Result<Vec<WebhookSubscription>, ClientError> {
        let data: ListData = self
            .execute(
                "webhookSubscriptions",
                queries::LIST_WEBHOOK_SUBSCRIPTIONS,
                json!({ "first": LIST_PAGE_SIZE }),
            )
            .await?;
        Ok(data.into_subscriptions())
    }

    pub async fn delete_webhook_subscription(
        &self,
        id: &str,
    ) -> Result<SubscriptionOutcome, ClientError> {
        let data: DeleteData = self
            .execute(
                "webhookSubscriptionDelete",
                queries::DELETE_WEBHOOK_SUBSCRIPTION,
                json!({ "id": id }),
            )
            .await?;
        data.into_outcome()
    }

    /// Subscribe `callback_url` to `topic` with JSON payloads.
    pub async fn create_webhook_subscription(
        &self,
        topic: &str,
        callback_url: &str,
    ) -> Result<SubscriptionOutcome, ClientError> {
        let data: CreateData = self
            .execute(
                "webhookSubscriptionCreate",
                queries::CREATE_WEBHOOK_SUBSCRIPTION,
                create_variables(topic, callback_url),
            )
            .await?;
        data.into_outcome()
    }
}
