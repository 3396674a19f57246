//! Converts `sea_orm::DbErr` into the shared [`kanban_domain::DomainError`]
//! taxonomy, at the DAL boundary — every query method in `crate::repo`
//! returns `DomainError` directly so callers never see a storage-engine
//! type (spec §7 error hygiene invariant: no storage-engine keywords in a
//! client-facing message).

use kanban_domain::DomainError;
use sea_orm::DbErr;

pub(crate) fn log_and_convert(op: &str, err: DbErr) -> DomainError {
    tracing::error!(operation = op, error = ?err, "database call failed");
    match err {
        DbErr::RecordNotFound(_) => DomainError::NotFound,
        DbErr::Query(ref inner) if is_unique_violation(&inner.to_string()) => {
            DomainError::conflict("a record with this value already exists")
        }
        other => DomainError::internal(other.to_string()),
    }
}

fn is_unique_violation(message: &str) -> bool {
    message.contains("duplicate key") || message.contains("unique constraint")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_domain_not_found() {
        let err = log_and_convert("test", DbErr::RecordNotFound("x".to_owned()));
        assert!(matches!(err, DomainError::NotFound));
    }
}
