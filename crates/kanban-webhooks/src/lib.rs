//! Webhook Dispatcher (spec §4.8, component I).

pub mod dispatcher;
pub mod signing;
pub mod ssrf;

pub use dispatcher::WebhookDispatcher;
pub use signing::{sign, verify_signature};

use async_trait::async_trait;
use kanban_domain::events::EventEnvelope;
use kanban_events::EventSubscriber;

#[async_trait]
impl EventSubscriber for WebhookDispatcher {
    async fn handle(&self, event: EventEnvelope) {
        let event_name = serde_json::to_value(event.event_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        let data = serde_json::json!({
            "orgId": event.org_id,
            "boardId": event.board_id,
            "cardId": event.card_id,
            "context": event.context,
        });
        self.fire(event.org_id, &event_name, data).await;
    }
}
