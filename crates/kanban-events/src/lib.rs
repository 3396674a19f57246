//! Event Bus & Automation Engine (spec §4.7, components G and H).

pub mod automation;
pub mod bus;

pub use automation::{AutomationEngine, LoggingNotificationSink, NotificationSink};
pub use bus::{EventPublisher, EventSubscriber, InProcessEventBus};
