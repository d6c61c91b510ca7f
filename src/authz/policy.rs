//! Decision rules over the role registry and permission catalog.
//!
//! Role switching and user management use two different orderings and are
//! deliberately kept as separate functions:
//!
//! - switching is reflexive: a principal may always stay at, or drop below,
//!   its original role;
//! - management is strict for managers: they reach only roles below them.

use super::permission::{has_any_permission, page_requirements, permissions_of};
use super::role::Role;

/// Whether a principal whose original role is `original` may act as `target`.
pub fn can_switch_to_role(original: Role, target: Role) -> bool {
    target.level() >= original.level()
}

/// Roles a principal may switch to, highest authority first. Always contains
/// `original` itself.
pub fn available_roles_for(original: Role) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|role| can_switch_to_role(original, *role))
        .collect()
}

/// Whether a principal acting as `acting` may edit or delete another principal
/// holding `target`.
pub fn can_manage(acting: Role, target: Role) -> bool {
    match acting {
        Role::SuperAdmin | Role::Admin => true,
        Role::Manager => target.level() > acting.level(),
        Role::User | Role::Viewer => false,
    }
}

/// Page gate. Unknown pages carry no requirement and are denied.
pub fn can_access_page(role: Role, page_id: &str) -> bool {
    has_any_permission(role, page_requirements(page_id))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role {lower} grants permissions that {higher} lacks: {missing:?}")]
pub struct HierarchyViolation {
    pub higher: Role,
    pub lower: Role,
    pub missing: Vec<String>,
}

/// Checks that every role's grants include the grants of all roles below it.
pub fn verify_permission_hierarchy() -> Result<(), HierarchyViolation> {
    for higher in Role::ALL {
        for lower in Role::ALL.into_iter().filter(|r| higher.outranks(*r)) {
            let granted = permissions_of(higher);
            let missing: Vec<String> = permissions_of(lower)
                .iter()
                .filter(|p| !granted.contains(p))
                .map(|p| p.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(HierarchyViolation {
                    higher,
                    lower,
                    missing,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_is_reflexive() {
        for role in Role::ALL {
            assert!(can_switch_to_role(role, role));
            assert!(available_roles_for(role).contains(&role));
        }
    }

    #[test]
    fn available_roles_match_switch_check() {
        for original in Role::ALL {
            let allowed: Vec<Role> = Role::ALL
                .into_iter()
                .filter(|t| can_switch_to_role(original, *t))
                .collect();
            assert_eq!(available_roles_for(original), allowed);
            for role in available_roles_for(original) {
                assert!(role.level() >= original.level());
            }
        }
    }

    #[test]
    fn upgrades_are_denied() {
        for original in Role::ALL {
            for target in Role::ALL.into_iter().filter(|t| t.outranks(original)) {
                assert!(!can_switch_to_role(original, target), "{original} -> {target}");
            }
        }
        assert!(!can_switch_to_role(Role::Manager, Role::Admin));
        assert!(can_switch_to_role(Role::Manager, Role::Viewer));
    }

    #[test]
    fn viewer_can_only_stay_viewer() {
        assert_eq!(available_roles_for(Role::Viewer), vec![Role::Viewer]);
        assert_eq!(available_roles_for(Role::SuperAdmin), Role::ALL.to_vec());
    }

    #[test]
    fn top_tiers_manage_everyone() {
        for acting in [Role::SuperAdmin, Role::Admin] {
            for target in Role::ALL {
                assert!(can_manage(acting, target), "{acting} -> {target}");
            }
        }
    }

    #[test]
    fn managers_reach_only_lower_roles() {
        assert!(!can_manage(Role::Manager, Role::Manager));
        assert!(!can_manage(Role::Manager, Role::Admin));
        assert!(!can_manage(Role::Manager, Role::SuperAdmin));
        assert!(can_manage(Role::Manager, Role::User));
        assert!(can_manage(Role::Manager, Role::Viewer));
    }

    #[test]
    fn lower_tiers_manage_nobody() {
        for acting in [Role::User, Role::Viewer] {
            for target in Role::ALL {
                assert!(!can_manage(acting, target));
            }
        }
    }

    #[test]
    fn unknown_pages_are_denied_for_every_role() {
        for role in Role::ALL {
            assert!(!can_access_page(role, "nonexistent-page"));
            assert!(!can_access_page(role, ""));
        }
    }

    #[test]
    fn page_scenarios() {
        assert!(can_access_page(Role::User, "dashboard"));
        assert!(!can_access_page(Role::User, "settings"));
        assert!(!can_access_page(Role::Viewer, "users"));
        assert!(can_access_page(Role::SuperAdmin, "settings"));
        assert!(!can_access_page(Role::Admin, "settings"));
    }

    #[test]
    fn reference_grants_are_monotonic() {
        assert_eq!(verify_permission_hierarchy(), Ok(()));
    }
}
