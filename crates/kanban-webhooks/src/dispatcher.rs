//! Webhook dispatcher (spec §4.8 component I).
//!
//! `fire` loads enabled webhooks for an event and delivers to each
//! concurrently via `tokio::spawn`, matching the fan-out style of
//! `kanban_events::InProcessEventBus` (SPEC_FULL §5.1). `deliver` never
//! throws outward — every failure is caught and recorded as a
//! `WebhookDelivery` row instead.

use crate::signing::sign;
use crate::ssrf::{validate_and_resolve, ResolvedTarget};
use kanban_db::KanbanRepo;
use kanban_domain::Webhook;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use uuid::Uuid;

const MAX_ATTEMPTS: u32 = 3;
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct WebhookDispatcher {
    repo: Arc<KanbanRepo>,
    user_agent: String,
    /// Only relevant in non-production environments — production always
    /// requires `https` (spec §4.8 step 1).
    allow_http: bool,
}

impl WebhookDispatcher {
    #[must_use]
    pub fn new(repo: Arc<KanbanRepo>, user_agent: String, allow_http: bool) -> Self {
        Self {
            repo,
            user_agent,
            allow_http,
        }
    }

    /// `fireWebhooks(orgId, event, data)` (spec §4.8). Never propagates an
    /// error — every failure path is logged and, where a webhook was
    /// actually attempted, recorded as a delivery row.
    #[tracing::instrument(skip(self, data), fields(org_id = %org_id, event))]
    pub async fn fire(&self, org_id: Uuid, event: &str, data: serde_json::Value) {
        let webhooks = match self.repo.webhooks_for_event(org_id, event).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = ?e, "failed to load webhooks for event");
                return;
            }
        };
        if webhooks.is_empty() {
            return;
        }

        let envelope = serde_json::json!({
            "event": event,
            "timestamp": OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            "orgId": org_id,
            "data": data,
        });
        let body = serde_json::to_vec(&envelope).unwrap_or_default();

        let mut handles = Vec::with_capacity(webhooks.len());
        for webhook in webhooks {
            let dispatcher = self.clone();
            let event = event.to_owned();
            let body = body.clone();
            handles.push(tokio::spawn(async move {
                dispatcher.deliver(webhook, event, body).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// `deliver(webhook, payload)` (spec §4.8): validate once, pin the
    /// resolved IP for every attempt, sign, retry on network error or
    /// 5xx, record one delivery row for the whole call.
    async fn deliver(&self, webhook: Webhook, event: String, body: Vec<u8>) {
        let start = Instant::now();

        let url = match reqwest::Url::parse(&webhook.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(webhook_id = %webhook.id, error = %e, "webhook url failed to parse");
                self.record(&webhook, &event, None, false, start.elapsed()).await;
                return;
            }
        };

        let target = match validate_and_resolve(&url, self.allow_http).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(webhook_id = %webhook.id, url = %url, error = ?e, "webhook url rejected by SSRF guard");
                self.record(&webhook, &event, None, false, start.elapsed()).await;
                return;
            }
        };

        let signature = sign(&body, &webhook.secret);
        let delivery_id = Uuid::now_v7();

        let mut last_status: Option<u16> = None;
        let mut success = false;

        for attempt in 0..MAX_ATTEMPTS {
            match self
                .attempt_once(&url, &target, &body, &signature, &event, delivery_id)
                .await
            {
                Ok(status) => {
                    last_status = Some(status);
                    success = status < 400;
                    let retryable_server_error = (500..600).contains(&status);
                    if success || !retryable_server_error {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(webhook_id = %webhook.id, attempt, error = %e, "webhook delivery attempt failed");
                }
            }
            if attempt + 1 < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(1u64 << attempt)).await;
            }
        }

        self.record(&webhook, &event, last_status, success, start.elapsed()).await;
    }

    async fn attempt_once(
        &self,
        url: &reqwest::Url,
        target: &ResolvedTarget,
        body: &[u8],
        signature: &str,
        event: &str,
        delivery_id: Uuid,
    ) -> Result<u16, reqwest::Error> {
        // Pin the resolved address for this request only; TLS SNI and
        // certificate validation still use the original hostname.
        let socket_addr = SocketAddr::new(target.ip, target.port);
        let client = reqwest::Client::builder()
            .resolve(&target.host, socket_addr)
            .timeout(ATTEMPT_TIMEOUT)
            .build()?;

        let response = client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .header("X-Signature-256", format!("sha256={signature}"))
            .header("X-Event", event)
            .header("X-Delivery", delivery_id.to_string())
            .header("User-Agent", &self.user_agent)
            .body(body.to_vec())
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn record(
        &self,
        webhook: &Webhook,
        event: &str,
        status_code: Option<u16>,
        success: bool,
        elapsed: Duration,
    ) {
        let payload = serde_json::json!({ "event": event });
        if let Err(e) = self
            .repo
            .webhook_deliveries_create(
                webhook.id,
                event.to_owned(),
                payload,
                status_code,
                success,
                elapsed.as_millis() as u64,
            )
            .await
        {
            tracing::error!(webhook_id = %webhook.id, error = ?e, "failed to record webhook delivery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_db::Migrator;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
    use sea_orm_migration::MigratorTrait;

    async fn test_repo_with_webhook(url: &str) -> (Arc<KanbanRepo>, Uuid) {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        let repo = Arc::new(KanbanRepo::new(Arc::new(conn)));

        let org_id = Uuid::now_v7();
        kanban_db::entities::tenant::org::ActiveModel {
            id: Set(org_id),
            name: Set("Acme".to_owned()),
            slug: Set("acme".to_owned()),
            plan: Set("FREE".to_owned()),
            deleted_at: Set(None),
        }
        .insert(repo.conn())
        .await
        .unwrap();

        repo.webhooks_create(
            org_id,
            url.to_owned(),
            "topsecret".to_owned(),
            vec!["CARD_CREATED".to_owned()],
        )
        .await
        .unwrap();

        (repo, org_id)
    }

    #[tokio::test]
    async fn ssrf_blocked_url_records_a_failed_delivery_without_panicking() {
        let (repo, org_id) = test_repo_with_webhook("https://localhost/hook").await;
        let dispatcher = WebhookDispatcher::new(repo.clone(), "kanban-webhooks/1.0".to_owned(), false);

        dispatcher
            .fire(org_id, "CARD_CREATED", serde_json::json!({"cardId": "x"}))
            .await;

        let webhooks = repo.webhooks_for_event(org_id, "CARD_CREATED").await.unwrap();
        assert_eq!(webhooks.len(), 1, "the webhook row itself is untouched by a failed delivery");
    }
}
