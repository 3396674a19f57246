//! Shared vocabulary for the kanban platform kernel.
//!
//! Every other crate in the workspace depends on this one for entity shapes,
//! the role hierarchy, the error taxonomy, and the event envelope. Keeping
//! these types here (rather than duplicated per-crate) is what lets the DAL,
//! the safe-action wrapper, and the automation engine agree on what a
//! `NOT_FOUND` or a `CARD_MOVED` event actually look like.

pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod role;
pub mod tenant;

pub use config::{AppLimits, PlanLimit, PlanLimits, RateLimitTable};
pub use entities::*;
pub use error::DomainError;
pub use events::{EventContext, EventEnvelope, EventType};
pub use role::Role;
pub use tenant::{Membership, TenantContext};
