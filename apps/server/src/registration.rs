//! Registers this service's webhooks with the store.
//!
//! Subscriptions that already point at the service are removed first, then
//! one subscription per [`Trigger`] is created.

use anyhow::bail;
use variantsync_inventory::Trigger;
use variantsync_shopify::{ShopifyClient, SubscriptionOutcome, WebhookSubscription};

use crate::api::webhook_path;

#[derive(Debug, PartialEq, Eq)]
pub struct RegistrationPlan {
    pub remove: Vec<WebhookSubscription>,
    /// Topic and callback URL of every subscription to create.
    pub create: Vec<(Trigger, String)>,
}

pub fn callback_url(app_url: &str, trigger: Trigger) -> String {
    format!("{}/api{}", app_url.trim_end_matches('/'), webhook_path(trigger))
}

fn points_at(subscription: &WebhookSubscription, app_url: &str) -> bool {
    subscription.callback_url.as_deref().is_some_and(|url| {
        url == app_url
            || url
                .strip_prefix(app_url)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

pub fn plan(existing: &[WebhookSubscription], app_url: &str) -> RegistrationPlan {
    let app_url = app_url.trim_end_matches('/');
    RegistrationPlan {
        remove: existing
            .iter()
            .filter(|s| points_at(s, app_url))
            .cloned()
            .collect(),
        create: Trigger::ALL
            .iter()
            .map(|&trigger| (trigger, callback_url(app_url, trigger)))
            .collect(),
    }
}

pub async fn register_webhooks(client: &ShopifyClient, app_url: &str) -> anyhow::Result<()> {
    tracing::info!("[Register] Store endpoint: {}", client.endpoint());
    tracing::info!("[Register] App URL: {}", app_url);

    let existing = client.list_webhook_subscriptions().await?;
    for subscription in &existing {
        tracing::info!(
            "[Register] Existing: {} -> {}",
            subscription.topic,
            subscription.callback_url.as_deref().unwrap_or("<non-http>")
        );
    }

    let plan = plan(&existing, app_url);
    let mut rejected = Vec::new();

    for subscription in &plan.remove {
        tracing::info!(
            "[Register] Removing {} ({})",
            subscription.topic,
            subscription.id
        );
        if let SubscriptionOutcome::Rejected { reason } =
            client.delete_webhook_subscription(&subscription.id).await?
        {
            tracing::warn!("[Register] Could not remove {}: {}", subscription.id, reason);
        }
    }

    for (trigger, url) in &plan.create {
        tracing::info!("[Register] Registering {} -> {}", trigger.topic(), url);
        match client.create_webhook_subscription(trigger.topic(), url).await? {
            SubscriptionOutcome::Done { id } => {
                tracing::info!("[Register] Created {} ({})", trigger.topic(), id)
            }
            SubscriptionOutcome::Rejected { reason } => {
                tracing::error!("[Register] {} rejected: {}", trigger.topic(), reason);
                rejected.push(format!("{}: {}", trigger.topic(), reason));
            }
        }
    }

    if !rejected.is_empty() {
        bail!("Webhook registration failed: {}", rejected.join("; "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(id: &str, topic: &str, url: Option<&str>) -> WebhookSubscription {
        WebhookSubscription {
            id: id.to_string(),
            topic: topic.to_string(),
            callback_url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_callback_urls() {
        assert_eq!(
            callback_url("https://sync.example.com/", Trigger::OrderPaid),
            "https://sync.example.com/api/webhooks/orders-paid"
        );
        assert_eq!(
            callback_url("https://sync.example.com", Trigger::RefundCreated),
            "https://sync.example.com/api/webhooks/refunds-create"
        );
    }

    #[test]
    fn test_plan_replaces_own_subscriptions_only() {
        let existing = vec![
            subscription(
                "1",
                "ORDERS_PAID",
                Some("https://sync.example.com/api/webhooks/orders-paid"),
            ),
            subscription("2", "ORDERS_PAID", Some("https://sync.example.com.other.net/hook")),
            subscription("3", "PRODUCTS_UPDATE", None),
            subscription("4", "APP_UNINSTALLED", Some("https://sync.example.com")),
        ];

        let plan = plan(&existing, "https://sync.example.com/");

        let removed: Vec<_> = plan.remove.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(removed, vec!["1", "4"]);
        assert_eq!(
            plan.create,
            vec![
                (
                    Trigger::OrderPaid,
                    "https://sync.example.com/api/webhooks/orders-paid".to_string()
                ),
                (
                    Trigger::OrderCancelled,
                    "https://sync.example.com/api/webhooks/orders-cancelled".to_string()
                ),
                (
                    Trigger::RefundCreated,
                    "https://sync.example.com/api/webhooks/refunds-create".to_string()
                ),
            ]
        );
    }
}
