//! Static configuration tables shared by the rate limiter and the DAL
//! (spec §6 Configuration). `kanban-server` owns loading these from the
//! environment (SPEC_FULL §4.11); this module only defines the shapes and
//! spec-mandated defaults so every crate that needs them agrees on the
//! numbers without depending on the server crate.

use crate::entities::Plan;
use std::collections::HashMap;

/// Requests-per-minute ceiling per action name (spec §6).
#[derive(Debug, Clone)]
pub struct RateLimitTable {
    limits: HashMap<String, u32>,
}

impl Default for RateLimitTable {
    fn default() -> Self {
        let pairs: &[(&str, u32)] = &[
            ("create-board", 10),
            ("create-card", 60),
            ("update-card", 120),
            ("update-card-order", 120),
            ("delete-card", 60),
            ("create-comment", 60),
            ("update-comment", 60),
            ("delete-comment", 40),
            ("add-reaction", 120),
            ("remove-reaction", 120),
        ];
        Self {
            limits: pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
        }
    }
}

impl RateLimitTable {
    #[must_use]
    pub fn requests_per_minute(&self, action: &str) -> Option<u32> {
        self.limits.get(action).copied()
    }

    pub fn set(&mut self, action: impl Into<String>, requests_per_minute: u32) {
        self.limits.insert(action.into(), requests_per_minute);
    }
}

/// Per-plan board/card ceilings (spec §6 Plan limits). `None` means unlimited.
#[derive(Debug, Clone, Copy)]
pub struct PlanLimit {
    pub boards: Option<u32>,
    pub cards_per_board: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PlanLimits {
    free: PlanLimit,
    pro: PlanLimit,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            free: PlanLimit {
                boards: Some(50),
                cards_per_board: Some(500),
            },
            pro: PlanLimit {
                boards: None,
                cards_per_board: None,
            },
        }
    }
}

impl PlanLimits {
    #[must_use]
    pub fn for_plan(&self, plan: Plan) -> PlanLimit {
        match plan {
            Plan::Free => self.free,
            Plan::Pro => self.pro,
        }
    }
}

/// The numeric ceilings from spec §6 that aren't tables: `DEMO_ORG_ID`,
/// `MAX_AUTOMATION_DEPTH`, `MAX_LEXORANK_LENGTH`, plus the two tables above,
/// bundled for convenient injection into services that need several of them.
#[derive(Debug, Clone)]
pub struct AppLimits {
    pub demo_org_id: String,
    pub system_user_id: Option<uuid::Uuid>,
    pub max_automation_depth: u8,
    pub max_lexorank_length: usize,
    pub rate_limits: RateLimitTable,
    pub plan_limits: PlanLimits,
}

impl Default for AppLimits {
    fn default() -> Self {
        Self {
            demo_org_id: "demo-org-id".to_owned(),
            system_user_id: None,
            max_automation_depth: 3,
            max_lexorank_length: 32,
            rate_limits: RateLimitTable::default(),
            plan_limits: PlanLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let limits = AppLimits::default();
        assert_eq!(limits.demo_org_id, "demo-org-id");
        assert_eq!(limits.max_automation_depth, 3);
        assert_eq!(limits.max_lexorank_length, 32);
        assert_eq!(limits.rate_limits.requests_per_minute("create-board"), Some(10));
        assert_eq!(limits.rate_limits.requests_per_minute("update-card"), Some(120));
        assert_eq!(limits.rate_limits.requests_per_minute("unknown-action"), None);
    }

    #[test]
    fn plan_limits_match_spec() {
        let limits = PlanLimits::default();
        let free = limits.for_plan(Plan::Free);
        assert_eq!(free.boards, Some(50));
        assert_eq!(free.cards_per_board, Some(500));
        let pro = limits.for_plan(Plan::Pro);
        assert_eq!(pro.boards, None);
        assert_eq!(pro.cards_per_board, None);
    }
}
