//! Per-(user, action) rate limiter (spec §4.1).
//!
//! A process-wide map mutated under a lock (spec §5 Shared-resource
//! policy), with no persistence — a restart resets every counter, which the
//! spec calls out as acceptable. Open Question 3 (SPEC_FULL §9.1): this
//! implements a fixed window keyed by first-request-in-window rather than a
//! token-bucket refill curve, since that is the simplest design satisfying
//! the boundary behavior in spec §8 ("request N allowed, N+1 denied, allowed
//! again after `resetInMs`").

use dashmap::DashMap;
use kanban_domain::config::RateLimitTable;
use kanban_domain::DomainError;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

const WINDOW: Duration = Duration::from_secs(60);

/// Clock abstraction so tests can advance time deterministically instead of
/// sleeping for real.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Outcome of a rate-limit check (spec §4.1: `{allowed, remaining, resetInMs}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in_ms: u64,
}

pub struct RateLimiter<C: Clock = SystemClock> {
    limits: RateLimitTable,
    buckets: DashMap<(Uuid, String), Mutex<Bucket>>,
    clock: C,
}

impl RateLimiter<SystemClock> {
    #[must_use]
    pub fn new(limits: RateLimitTable) -> Self {
        Self::with_clock(limits, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    #[must_use]
    pub fn with_clock(limits: RateLimitTable, clock: C) -> Self {
        Self {
            limits,
            buckets: DashMap::new(),
            clock,
        }
    }

    /// `check(user, action)` from spec §4.1. Actions absent from the
    /// configured table are not rate limited (the table only enumerates
    /// mutating safe-actions; read paths never call this).
    pub fn check(&self, user_id: Uuid, action: &str) -> RateLimitOutcome {
        let Some(limit) = self.limits.requests_per_minute(action) else {
            return RateLimitOutcome {
                allowed: true,
                remaining: u32::MAX,
                reset_in_ms: 0,
            };
        };

        let now = self.clock.now();
        let entry = self
            .buckets
            .entry((user_id, action.to_owned()))
            .or_insert_with(|| {
                Mutex::new(Bucket {
                    window_start: now,
                    count: 0,
                })
            });
        let mut bucket = entry.lock();

        if now.duration_since(bucket.window_start) >= WINDOW {
            bucket.window_start = now;
            bucket.count = 0;
        }

        let elapsed = now.duration_since(bucket.window_start);
        let reset_in_ms = WINDOW.saturating_sub(elapsed).as_millis() as u64;

        if bucket.count >= limit {
            RateLimitOutcome {
                allowed: false,
                remaining: 0,
                reset_in_ms,
            }
        } else {
            bucket.count += 1;
            RateLimitOutcome {
                allowed: true,
                remaining: limit - bucket.count,
                reset_in_ms,
            }
        }
    }

    /// Convenience wrapper producing the typed error the safe-action
    /// wrapper propagates (spec §4.6 step 4, §7 `RATE_LIMITED`).
    pub fn check_or_err(&self, user_id: Uuid, action: &str) -> Result<(), DomainError> {
        let outcome = self.check(user_id, action);
        if outcome.allowed {
            Ok(())
        } else {
            Err(DomainError::RateLimited {
                retry_after_secs: outcome.reset_in_ms.div_ceil(1000),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FakeClock {
        base: Instant,
        offset_ms: AtomicU64,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset_ms: AtomicU64::new(0),
            }
        }

        fn advance(&self, ms: u64) {
            self.offset_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    fn limiter_with(action: &str, rpm: u32) -> RateLimiter<FakeClock> {
        let mut table = RateLimitTable::default();
        table.set(action, rpm);
        RateLimiter::with_clock(table, FakeClock::new())
    }

    #[test]
    fn unconfigured_action_is_never_limited() {
        let limiter = RateLimiter::new(RateLimitTable::default());
        let user = Uuid::new_v4();
        for _ in 0..1000 {
            assert!(limiter.check(user, "read-board").allowed);
        }
    }

    #[test]
    fn request_n_allowed_n_plus_one_denied() {
        let limiter = limiter_with("create-board", 3);
        let user = Uuid::new_v4();

        assert!(limiter.check(user, "create-board").allowed);
        assert!(limiter.check(user, "create-board").allowed);
        assert!(limiter.check(user, "create-board").allowed);
        let denied = limiter.check(user, "create-board");
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn allowed_again_after_reset_window() {
        let limiter = limiter_with("create-board", 1);
        let user = Uuid::new_v4();
        limiter.clock.advance(0);

        assert!(limiter.check(user, "create-board").allowed);
        assert!(!limiter.check(user, "create-board").allowed);

        limiter.clock.advance(60_001);
        assert!(limiter.check(user, "create-board").allowed);
    }

    #[test]
    fn separate_users_have_independent_buckets() {
        let limiter = limiter_with("create-card", 1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(limiter.check(a, "create-card").allowed);
        assert!(!limiter.check(a, "create-card").allowed);
        assert!(limiter.check(b, "create-card").allowed);
    }

    #[test]
    fn separate_actions_have_independent_buckets() {
        let limiter = limiter_with("create-card", 1);
        let user = Uuid::new_v4();

        assert!(limiter.check(user, "create-card").allowed);
        // A different action for the same user is a different bucket key,
        // and is unconfigured here so it is never limited.
        assert!(limiter.check(user, "update-card").allowed);
    }

    #[test]
    fn check_or_err_maps_to_rate_limited_domain_error() {
        let limiter = limiter_with("create-board", 1);
        let user = Uuid::new_v4();
        limiter.check_or_err(user, "create-board").unwrap();
        let err = limiter.check_or_err(user, "create-board").unwrap_err();
        assert!(matches!(err, DomainError::RateLimited { .. }));
    }
}
