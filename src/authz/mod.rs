//! Authorization module - role registry, permission catalog and policy checks
//!
//! This module implements the RBAC engine with support for:
//! - A closed, strictly ordered set of roles
//! - Identity-to-role resolution with a non-privileged fallback
//! - Temporary self-demotion (role switching) bounded by the original role
//! - Management reach over other principals
//! - Page and action gates with "any of" / "all of" composites
//!
//! Everything here except [`PolicyEvaluator`] logging is pure and synchronous.

mod evaluator;
mod permission;
mod policy;
mod principal;
mod resolver;
mod role;

pub use evaluator::{DefaultPolicyEvaluator, ManageAction, MatchMode, PolicyEvaluator};
pub use permission::{
    has_all_permissions, has_any_permission, has_permission, page_requirements, permissions_of,
    ParsePermissionError, Permission, PAGES,
};
pub use policy::{
    available_roles_for, can_access_page, can_manage, can_switch_to_role,
    verify_permission_hierarchy, HierarchyViolation,
};
pub use principal::Principal;
pub use resolver::{load_accounts_file, reference_accounts, RoleResolver, REFERENCE_ACCOUNTS};
pub use role::{ParseRoleError, Role};
