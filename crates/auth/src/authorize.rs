use thiserror::Error;

use novastock_core::BranchId;

use crate::roles::Role;

/// Which alerts a caller may see.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlertScope {
    All,
    Branch(BranchId),
}

impl AlertScope {
    pub fn allows(&self, branch_id: BranchId) -> bool {
        match self {
            AlertScope::All => true,
            AlertScope::Branch(b) => *b == branch_id,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("invalid role '{0}' (expected 'administrator' or 'branchStaff')")]
    InvalidRole(String),

    #[error("role 'branchStaff' requires a branch_id")]
    MissingBranch,
}

/// Resolve the alert scope for a listing request.
///
/// - No IO
/// - No panics
/// - Pure policy check
///
/// Administrators see everything (a supplied branch id is ignored); branch
/// staff must name their branch.
pub fn authorize_alert_access(
    role: &str,
    branch_id: Option<BranchId>,
) -> Result<AlertScope, AccessError> {
    match role.parse::<Role>()? {
        Role::Administrator => Ok(AlertScope::All),
        Role::BranchStaff => branch_id
            .map(AlertScope::Branch)
            .ok_or(AccessError::MissingBranch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_sees_everything() {
        let scope = authorize_alert_access("administrator", None).unwrap();
        assert_eq!(scope, AlertScope::All);
        assert!(scope.allows(BranchId::new(9)));

        let scope = authorize_alert_access("administrator", Some(BranchId::new(2))).unwrap();
        assert_eq!(scope, AlertScope::All);
    }

    #[test]
    fn branch_staff_is_scoped_to_their_branch() {
        let scope = authorize_alert_access("branchStaff", Some(BranchId::new(2))).unwrap();
        assert!(scope.allows(BranchId::new(2)));
        assert!(!scope.allows(BranchId::new(3)));
    }

    #[test]
    fn branch_staff_without_branch_is_rejected() {
        assert_eq!(
            authorize_alert_access("branchStaff", None),
            Err(AccessError::MissingBranch)
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            authorize_alert_access("guest", Some(BranchId::new(1))),
            Err(AccessError::InvalidRole(_))
        ));
    }
}
