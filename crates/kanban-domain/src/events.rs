//! Event envelope (spec §4.7).
//!
//! `EventEnvelope` is what the DAL publishes and what the automation engine
//! and webhook dispatcher both consume. `context` is a typed payload per
//! event type rather than a loose JSON blob, so a trigger match (e.g.
//! `CARD_MOVED`'s `fromListId`) is a field access, not a map lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CardCreated,
    CardMoved,
    CardDeleted,
    CardDueSoon,
    CardOverdue,
    LabelAdded,
    ChecklistCompleted,
    MemberAssigned,
    PriorityChanged,
    CardTitleContains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventContext {
    CardMoved {
        from_list_id: Uuid,
        to_list_id: Uuid,
    },
    CardDueSoon {
        due_date: time::OffsetDateTime,
    },
    LabelAdded {
        label_id: Uuid,
    },
    CardTitleContains {
        card_title: String,
    },
    /// Open Question 1 (SPEC_FULL §9.1): fires even when the assignee is
    /// cleared, carrying `None` in that case.
    MemberAssigned {
        assignee_id: Option<Uuid>,
    },
    PriorityChanged {
        old_priority: crate::entities::Priority,
        new_priority: crate::entities::Priority,
    },
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub org_id: Uuid,
    pub board_id: Uuid,
    pub card_id: Uuid,
    #[serde(default)]
    pub context: EventContext,
    /// Recursion depth guard (spec §4.7). Absent/zero at the request
    /// boundary; incremented by one each time the automation engine's own
    /// actions re-publish an event.
    #[serde(default, rename = "_depth")]
    pub depth: u8,
}

impl Default for EventContext {
    fn default() -> Self {
        EventContext::None
    }
}

impl EventEnvelope {
    #[must_use]
    pub fn new(event_type: EventType, org_id: Uuid, board_id: Uuid, card_id: Uuid) -> Self {
        Self {
            event_type,
            org_id,
            board_id,
            card_id,
            context: EventContext::None,
            depth: 0,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// Derive the next-depth envelope for an action-triggered cascade
    /// (spec §4.7 step 1).
    #[must_use]
    pub fn child(&self, event_type: EventType, context: EventContext) -> Self {
        Self {
            event_type,
            org_id: self.org_id,
            board_id: self.board_id,
            card_id: self.card_id,
            context,
            depth: self.depth + 1,
        }
    }
}
