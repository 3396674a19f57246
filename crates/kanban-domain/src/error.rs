//! Error taxonomy (spec §7).
//!
//! `DomainError` is the single typed error every component below the
//! safe-action wrapper returns. The wrapper (`kanban-actions`) is the only
//! place that converts these into client-facing strings; everywhere else
//! they propagate with `?`.
//!
//! Hygiene invariant (spec §7, testable): `Display` on every variant must
//! never include a user id, org id, or storage-layer message. Variants that
//! need an internal detail for logs carry it in a separate field that
//! `Display` does not read; `Debug` may still expose it for `tracing::error!`.

use thiserror::Error;

/// Typed error kind bubbled up from the tenant/role/DAL layers to the
/// safe-action wrapper.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Missing/invalid identity, or self-healing user provisioning failed.
    #[error("authentication required")]
    Unauthenticated,

    /// Role below the required minimum, or membership inactive.
    #[error("forbidden")]
    Forbidden,

    /// Entity absent OR belongs to a different organization. Never
    /// distinguished from "absent" in the client-facing message — this is
    /// what prevents the existence oracle described in spec §4.5.
    #[error("not found")]
    NotFound,

    /// Schema validation rejected the input. `fields` carries `field ->
    /// message` and is surfaced as `fieldErrors`, never as free text.
    #[error("validation failed")]
    Validation { fields: Vec<(String, String)> },

    /// Rate limit exceeded. `retry_after_secs` is used to build the
    /// user-visible "try again in Ns" message.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Mutation attempted on the configured demo organization.
    #[error("demo mode")]
    Demo,

    /// A contract-specific conflict (duplicate reaction, duplicate label
    /// name, etc). `message` is pre-vetted to be safe to surface verbatim.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Anything else. `detail` is logged internally only and must never be
    /// read by a caller building a client response.
    #[error("internal error")]
    Internal { detail: String },
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            fields: vec![(field.into(), message.into())],
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        DomainError::Internal {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_never_leaks_internal_detail() {
        let err = DomainError::internal("postgres: duplicate key value violates constraint");
        let rendered = err.to_string();
        assert!(!rendered.contains("postgres"));
        assert!(!rendered.contains("constraint"));
    }

    #[test]
    fn not_found_and_forbidden_render_generic_messages() {
        assert_eq!(DomainError::NotFound.to_string(), "not found");
        assert_eq!(DomainError::Forbidden.to_string(), "forbidden");
    }

    #[test]
    fn conflict_message_is_carried_verbatim() {
        let err = DomainError::conflict("Already reacted");
        assert_eq!(err.to_string(), "conflict: Already reacted");
    }
}
