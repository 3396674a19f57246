//! Event bus (spec §4.7 component G).
//!
//! Grounded on the `Arc<dyn EventPublisher<T>>` port that
//! `users_info::domain::service::users` depends on (`self.events.publish(&UserDomainEvent::Created {..})`):
//! publishing is a synchronous, fire-and-forget call from the caller's point
//! of view. Here the bus owns the fan-out to every subscriber instead of the
//! caller, and detaches the actual work onto the shared runtime
//! (SPEC_FULL §5.1) so a slow automation or webhook delivery never holds up
//! the mutation that published the event.

use async_trait::async_trait;
use kanban_domain::events::EventEnvelope;
use std::sync::Arc;

/// A sink that reacts to published events. The automation engine
/// (`AutomationEngine`) and the webhook dispatcher (`kanban-webhooks`) are
/// the two production implementations (spec §4.7 "fans out to ... and ...").
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn handle(&self, event: EventEnvelope);
}

/// Generic publish port, mirroring the teacher's `EventPublisher<T>` trait.
pub trait EventPublisher<E>: Send + Sync {
    fn publish(&self, event: E);
}

/// In-process fan-out bus: every subscriber is invoked independently on its
/// own spawned task, so one subscriber's latency or panic cannot affect
/// another's.
pub struct InProcessEventBus {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn EventSubscriber>>) -> Self {
        Self { subscribers }
    }
}

impl EventPublisher<EventEnvelope> for InProcessEventBus {
    fn publish(&self, event: EventEnvelope) {
        for subscriber in &self.subscribers {
            let subscriber = Arc::clone(subscriber);
            let event = event.clone();
            tokio::spawn(async move {
                subscriber.handle(event).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_domain::events::EventType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingSubscriber {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventSubscriber for CountingSubscriber {
        async fn handle(&self, _event: EventEnvelope) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn publish_fans_out_to_every_subscriber() {
        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));
        let bus = InProcessEventBus::new(vec![
            Arc::new(CountingSubscriber {
                count: Arc::clone(&count_a),
            }),
            Arc::new(CountingSubscriber {
                count: Arc::clone(&count_b),
            }),
        ]);

        bus.publish(EventEnvelope::new(
            EventType::CardCreated,
            Uuid::now_v7(),
            Uuid::now_v7(),
            Uuid::now_v7(),
        ));

        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }
}
