use std::{sync::Arc, time::Instant};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use variantsync_inventory::{
    BatchProcessor, BatchStatus, StoreEvent, SyncResult, Trigger,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    webhook::{self, HMAC_HEADER},
};

/// Overall status of a webhook run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Ok,
    Partial,
    NoValidSkus,
}

impl From<BatchStatus> for WebhookStatus {
    fn from(status: BatchStatus) -> Self {
        match status {
            BatchStatus::Ok => WebhookStatus::Ok,
            BatchStatus::Partial => WebhookStatus::Partial,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: WebhookStatus,
    pub trigger: Trigger,
    pub order: String,
    /// Wall time of the run, e.g. `"842ms"`.
    pub duration: String,
    pub results: Vec<SyncResult>,
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn orders_paid(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    handle_webhook(&state, Trigger::OrderPaid, &headers, &body).await
}

async fn orders_cancelled(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    handle_webhook(&state, Trigger::OrderCancelled, &headers, &body).await
}

async fn refunds_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    handle_webhook(&state, Trigger::RefundCreated, &headers, &body).await
}

async fn handle_webhook(
    state: &AppState,
    trigger: Trigger,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Json<WebhookResponse>> {
    let started = Instant::now();

    if let Some(secret) = state.webhook_secret.as_deref() {
        let signature = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok());
        if !webhook::verify(secret, body, signature) {
            tracing::error!("[Webhook {}] Invalid HMAC signature", trigger);
            return Err(ApiError::Unauthorized("Invalid signature".to_string()));
        }
    }

    let event = StoreEvent::parse(trigger, body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} payload: {}", trigger, e)))?;
    tracing::info!(
        "[Webhook {}] Order {} received with {} line items",
        trigger,
        event.order,
        event.candidates.len()
    );

    if !event.has_valid_sku() {
        tracing::info!(
            "[Webhook {}] Order {}: no valid SKUs found, skipping",
            trigger,
            event.order
        );
        return Ok(Json(WebhookResponse {
            status: WebhookStatus::NoValidSkus,
            trigger,
            order: event.order,
            duration: format_duration(started),
            results: Vec::new(),
        }));
    }

    let batch = BatchProcessor::new(&state.orchestrator)
        .process(&event.candidates)
        .await;
    let duration = format_duration(started);

    tracing::info!(
        "[Webhook {}] Order {} complete in {}: {} groups, {} variants updated{}",
        trigger,
        event.order,
        duration,
        batch.results.len(),
        batch.total_updated(),
        if batch.status == BatchStatus::Partial {
            " (with errors)"
        } else {
            ""
        }
    );

    Ok(Json(WebhookResponse {
        status: batch.status.into(),
        trigger,
        order: event.order,
        duration,
        results: batch.results,
    }))
}

#[derive(Deserialize)]
struct TestSyncParams {
    sku: Option<String>,
}

async fn test_sync(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TestSyncParams>,
) -> ApiResult<Json<SyncResult>> {
    let sku = params
        .sku
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Missing ?sku= parameter. Example: ?sku=BXAAA-1".to_string())
        })?;

    tracing::info!("[Test] Triggering sync for {}", sku);
    let result = state.orchestrator.sync_sku(&sku).await?;
    Ok(Json(result))
}

/// Path of a webhook route below `/api`.
pub fn webhook_path(trigger: Trigger) -> &'static str {
    match trigger {
        Trigger::OrderPaid => "/webhooks/orders-paid",
        Trigger::OrderCancelled => "/webhooks/orders-cancelled",
        Trigger::RefundCreated => "/webhooks/refunds-create",
    }
}

fn format_duration(started: Instant) -> String {
    format!("{}ms", started.elapsed().as_millis())
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/test-sync", get(test_sync))
        .route(webhook_path(Trigger::OrderPaid), post(orders_paid))
        .route(webhook_path(Trigger::OrderCancelled), post(orders_cancelled))
        .route(webhook_path(Trigger::RefundCreated), post(refunds_create));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}
