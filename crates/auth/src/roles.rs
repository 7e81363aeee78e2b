use serde::{Deserialize, Serialize};

use crate::authorize::AccessError;

/// Caller role for alert review.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Sees every alert system-wide.
    Administrator,
    /// Sees only the alerts of their own branch.
    BranchStaff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::BranchStaff => "branchStaff",
        }
    }
}

impl core::str::FromStr for Role {
    type Err = AccessError;

    /// Accepts the canonical names plus the short/snake_case spellings used by
    /// older clients (`admin`, `branch_staff`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "branchStaff" | "branch_staff" => Ok(Role::BranchStaff),
            other => Err(AccessError::InvalidRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_legacy_names() {
        assert_eq!("administrator".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("branchStaff".parse::<Role>().unwrap(), Role::BranchStaff);
        assert_eq!("branch_staff".parse::<Role>().unwrap(), Role::BranchStaff);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            "manager".parse::<Role>(),
            Err(AccessError::InvalidRole(r)) if r == "manager"
        ));
    }
}
