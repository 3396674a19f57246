//! Plan-limit enforcement port (SPEC_FULL §3.2).
//!
//! The concrete source of plan limits is billing, which is out of scope
//! (spec §1 Non-goals) — so the DAL only depends on this trait, the way
//! `users_info::UsersService` depends on `authz_resolver_sdk::PolicyEnforcer`
//! without implementing policy evaluation itself. `StaticPlanLimiter` is the
//! default implementation, backed by the table in `kanban_domain::config`.

use kanban_domain::{DomainError, Plan, PlanLimits};

pub trait PlanLimiter: Send + Sync {
    /// Errors with `DomainError::Validation` when `current_count` has
    /// already reached the plan's board ceiling.
    fn check_board_limit(&self, plan: Plan, current_count: u64) -> Result<(), DomainError>;

    /// Errors with `DomainError::Validation` when `current_count` has
    /// already reached the plan's per-board card ceiling.
    fn check_card_limit(&self, plan: Plan, current_count: u64) -> Result<(), DomainError>;
}

pub struct StaticPlanLimiter {
    limits: PlanLimits,
}

impl StaticPlanLimiter {
    #[must_use]
    pub fn new(limits: PlanLimits) -> Self {
        Self { limits }
    }
}

impl Default for StaticPlanLimiter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl PlanLimiter for StaticPlanLimiter {
    fn check_board_limit(&self, plan: Plan, current_count: u64) -> Result<(), DomainError> {
        let limit = self.limits.for_plan(plan);
        match limit.boards {
            Some(max) if current_count >= u64::from(max) => Err(DomainError::validation(
                "boards",
                "plan board limit reached",
            )),
            _ => Ok(()),
        }
    }

    fn check_card_limit(&self, plan: Plan, current_count: u64) -> Result<(), DomainError> {
        let limit = self.limits.for_plan(plan);
        match limit.cards_per_board {
            Some(max) if current_count >= u64::from(max) => {
                Err(DomainError::validation("cards", "plan card limit reached"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_rejects_at_board_ceiling() {
        let limiter = StaticPlanLimiter::default();
        assert!(limiter.check_board_limit(Plan::Free, 49).is_ok());
        assert!(limiter.check_board_limit(Plan::Free, 50).is_err());
    }

    #[test]
    fn pro_plan_is_unbounded() {
        let limiter = StaticPlanLimiter::default();
        assert!(limiter.check_board_limit(Plan::Pro, 1_000_000).is_ok());
        assert!(limiter.check_card_limit(Plan::Pro, 1_000_000).is_ok());
    }
}
