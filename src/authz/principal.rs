use serde::Serialize;

use super::permission::{permissions_of, Permission};
use super::policy::{available_roles_for, can_switch_to_role};
use super::role::Role;

/// The authenticated identity under evaluation together with its roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub identifier: String,
    pub original_role: Role,
    /// Role currently in effect for the session.
    pub effective_role: Role,
}

impl Principal {
    /// New session state: the effective role starts at the original role.
    pub fn new(identifier: impl Into<String>, original_role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            original_role,
            effective_role: original_role,
        }
    }

    /// Restores session state from a previously stored effective role. A stored
    /// role the principal may not hold is discarded in favour of the original.
    pub fn resume(identifier: impl Into<String>, original_role: Role, stored: Option<Role>) -> Self {
        let mut principal = Self::new(identifier, original_role);
        if let Some(role) = stored {
            if !principal.switch_role(role) {
                tracing::warn!(
                    identifier = %principal.identifier,
                    stored = %role,
                    "stored role exceeds original role, resetting"
                );
            }
        }
        principal
    }

    /// Moves the effective role to `target` when allowed. A denied switch
    /// leaves the effective role unchanged.
    pub fn switch_role(&mut self, target: Role) -> bool {
        if !can_switch_to_role(self.original_role, target) {
            return false;
        }
        self.effective_role = target;
        true
    }

    pub fn available_roles(&self) -> Vec<Role> {
        available_roles_for(self.original_role)
    }

    pub fn permissions(&self) -> &'static [Permission] {
        permissions_of(self.effective_role)
    }

    pub fn is_acting_below_original(&self) -> bool {
        self.effective_role != self.original_role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_role_starts_at_original() {
        let principal = Principal::new("test@example.com", Role::Manager);
        assert_eq!(principal.effective_role, Role::Manager);
        assert!(!principal.is_acting_below_original());
    }

    #[test]
    fn denied_switch_is_a_no_op() {
        let mut principal = Principal::new("test@example.com", Role::Manager);
        assert!(principal.switch_role(Role::Viewer));
        assert!(!principal.switch_role(Role::Admin));
        assert_eq!(principal.effective_role, Role::Viewer);
    }

    #[test]
    fn switching_back_up_to_original_is_allowed() {
        let mut principal = Principal::new("john.doe@example.com", Role::Admin);
        assert!(principal.switch_role(Role::User));
        assert!(principal.switch_role(Role::Admin));
        assert_eq!(principal.effective_role, Role::Admin);
        assert!(!principal.switch_role(Role::SuperAdmin));
    }

    #[test]
    fn resume_revalidates_stored_role() {
        let valid = Principal::resume("a@example.com", Role::Admin, Some(Role::Viewer));
        assert_eq!(valid.effective_role, Role::Viewer);

        let escalated = Principal::resume("a@example.com", Role::User, Some(Role::SuperAdmin));
        assert_eq!(escalated.effective_role, Role::User);

        let fresh = Principal::resume("a@example.com", Role::User, None);
        assert_eq!(fresh.effective_role, Role::User);
    }

    #[test]
    fn permissions_follow_effective_role() {
        let mut principal = Principal::new("owner@example.com", Role::SuperAdmin);
        assert!(principal.permissions().contains(&Permission::ManageSettings));
        principal.switch_role(Role::Viewer);
        assert_eq!(principal.permissions(), &[Permission::ViewDashboard]);
        assert_eq!(principal.available_roles(), Role::ALL.to_vec());
    }
}
