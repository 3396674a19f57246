//! Role hierarchy (spec §4.4).
//!
//! `Role` is a total order over four membership levels. Comparison is by
//! numeric weight, never by declaration order, so `Role::Admin >=
//! Role::Member` reads the way the spec's hierarchy table does.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Membership role within an organization, ordered `Guest < Member < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Guest,
    Member,
    Admin,
    Owner,
}

impl Role {
    /// Numeric weight used for hierarchy comparisons. Matches spec §2:
    /// `{GUEST:1, MEMBER:2, ADMIN:3, OWNER:4}`.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Role::Guest => 1,
            Role::Member => 2,
            Role::Admin => 3,
            Role::Owner => 4,
        }
    }

    /// Normalize a token-supplied role string per spec §4.3: case-insensitive,
    /// strips a leading `"org:"` prefix, unknown or absent values default to
    /// `Member`.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Role::Member;
        };
        let lowered = raw.to_ascii_lowercase();
        let trimmed = lowered.strip_prefix("org:").unwrap_or(&lowered);
        match trimmed {
            "admin" => Role::Admin,
            "owner" => Role::Owner,
            "guest" => Role::Guest,
            _ => Role::Member,
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight().cmp(&other.weight())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Guest => "GUEST",
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
            Role::Owner => "OWNER",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_match_spec_table() {
        assert_eq!(Role::Guest.weight(), 1);
        assert_eq!(Role::Member.weight(), 2);
        assert_eq!(Role::Admin.weight(), 3);
        assert_eq!(Role::Owner.weight(), 4);
    }

    #[test]
    fn ordering_is_total() {
        assert!(Role::Guest < Role::Member);
        assert!(Role::Member < Role::Admin);
        assert!(Role::Admin < Role::Owner);
        assert!(Role::Owner >= Role::Owner);
    }

    #[test]
    fn normalize_strips_org_prefix_case_insensitively() {
        assert_eq!(Role::normalize(Some("org:Admin")), Role::Admin);
        assert_eq!(Role::normalize(Some("OWNER")), Role::Owner);
        assert_eq!(Role::normalize(Some("guest")), Role::Guest);
        assert_eq!(Role::normalize(Some("ORG:ADMIN")), Role::Admin);
    }

    #[test]
    fn normalize_defaults_to_member() {
        assert_eq!(Role::normalize(None), Role::Member);
        assert_eq!(Role::normalize(Some("")), Role::Member);
        assert_eq!(Role::normalize(Some("superadmin")), Role::Member);
    }
}
