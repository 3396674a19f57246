//! Entity value types (spec §3 and §3.1 supplement).
//!
//! These are plain data shapes shared across crates — `kanban-db` maps them
//! to/from `sea_orm` entities, `kanban-actions` validates them, and
//! `kanban-events`/`kanban-webhooks` serialize them into envelopes. None of
//! these types know how to persist themselves; that is the DAL's job.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Billing plan. Gates board/card counts per spec §6 Plan limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    Free,
    Pro,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub plan: Plan,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub external_identity_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub order: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<OffsetDateTime>,
    pub assignee_user_id: Option<Uuid>,
    pub order: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardLabel {
    pub card_id: Uuid,
    pub label_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author_user_id: Uuid,
    pub text: String,
    pub parent_id: Option<Uuid>,
    pub is_draft: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
}

/// Checklist supplement (SPEC_FULL §3.1) — gives `COMPLETE_CHECKLIST` a real target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: Uuid,
    pub card_id: Uuid,
    pub title: String,
    pub order: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub text: String,
    pub is_complete: bool,
    pub order: String,
}

/// Automation trigger (spec §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sea_orm::FromJsonQueryResult)]
#[serde(tag = "type")]
pub enum AutomationTrigger {
    CardCreated,
    CardMoved { list_id: Option<Uuid> },
    CardDeleted,
    CardDueSoon { days_before_due: i64 },
    CardOverdue,
    LabelAdded { label_id: Option<Uuid> },
    ChecklistCompleted,
    MemberAssigned,
    PriorityChanged,
    CardTitleContains { keyword: String },
}

/// Condition comparison operator (spec §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Eq,
    Neq,
    IsNull,
    IsNotNull,
    /// Anything the engine does not recognize. Fails closed (spec §4.7).
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sea_orm::FromJsonQueryResult)]
pub struct AutomationCondition {
    pub field: String,
    pub op: ConditionOp,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Automation action variant (spec §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sea_orm::FromJsonQueryResult)]
#[serde(tag = "type")]
pub enum AutomationAction {
    SetPriority { priority: Priority },
    AssignMember { assignee_id: Uuid },
    AddLabel { label_id: Uuid },
    RemoveLabel { label_id: Uuid },
    SetDueDateOffset { days_offset: i64 },
    MoveCard { list_id: Uuid },
    CompleteChecklist {
        checklist_id: Uuid,
        item_id: Option<Uuid>,
    },
    PostComment { comment: String },
    SendNotification { notification_message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    pub id: Uuid,
    pub org_id: Uuid,
    pub board_id: Option<Uuid>,
    pub name: String,
    pub is_enabled: bool,
    pub trigger: AutomationTrigger,
    pub conditions: Vec<AutomationCondition>,
    pub actions: Vec<AutomationAction>,
    pub run_count: i64,
    pub last_run_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationLog {
    pub id: Uuid,
    pub automation_id: Uuid,
    pub card_id: Option<Uuid>,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub org_id: Uuid,
    pub url: String,
    pub secret: String,
    pub events: Vec<String>,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub event: String,
    pub payload: serde_json::Value,
    pub status_code: Option<u16>,
    pub success: bool,
    pub duration_ms: u64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub entity_title: String,
    pub action: AuditAction,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: OffsetDateTime,
}
