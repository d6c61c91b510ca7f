//! Permission catalog, role grants and page requirements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

/// Atomic capability token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Dashboard
    ViewDashboard,
    ViewAnalytics,

    // User management
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,
    BulkActions,

    // Permission management
    ManagePermissions,
    AssignRoles,

    // System
    ManageSettings,
    ViewLogs,
    ExportData,
}

impl Permission {
    pub const ALL: [Permission; 12] = [
        Permission::ViewDashboard,
        Permission::ViewAnalytics,
        Permission::ViewUsers,
        Permission::CreateUsers,
        Permission::EditUsers,
        Permission::DeleteUsers,
        Permission::BulkActions,
        Permission::ManagePermissions,
        Permission::AssignRoles,
        Permission::ManageSettings,
        Permission::ViewLogs,
        Permission::ExportData,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ViewUsers => "view_users",
            Permission::CreateUsers => "create_users",
            Permission::EditUsers => "edit_users",
            Permission::DeleteUsers => "delete_users",
            Permission::BulkActions => "bulk_actions",
            Permission::ManagePermissions => "manage_permissions",
            Permission::AssignRoles => "assign_roles",
            Permission::ManageSettings => "manage_settings",
            Permission::ViewLogs => "view_logs",
            Permission::ExportData => "export_data",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct ParsePermissionError(pub String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}

use Permission::*;

const SUPER_ADMIN_GRANTS: &[Permission] = &Permission::ALL;

const ADMIN_GRANTS: &[Permission] = &[
    ViewDashboard,
    ViewAnalytics,
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,
    BulkActions,
    ExportData,
];

// Deletion reach is still bounded by `can_manage`.
const MANAGER_GRANTS: &[Permission] = &[
    ViewDashboard,
    ViewAnalytics,
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,
    ExportData,
];

const USER_GRANTS: &[Permission] = &[ViewDashboard, ViewUsers];

const VIEWER_GRANTS: &[Permission] = &[ViewDashboard];

/// Permissions granted to `role`.
pub fn permissions_of(role: Role) -> &'static [Permission] {
    match role {
        Role::SuperAdmin => SUPER_ADMIN_GRANTS,
        Role::Admin => ADMIN_GRANTS,
        Role::Manager => MANAGER_GRANTS,
        Role::User => USER_GRANTS,
        Role::Viewer => VIEWER_GRANTS,
    }
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_of(role).contains(&permission)
}

/// True when at least one of `permissions` is granted. An empty request is
/// never satisfied.
pub fn has_any_permission<'a, I>(role: Role, permissions: I) -> bool
where
    I: IntoIterator<Item = &'a Permission>,
{
    permissions
        .into_iter()
        .any(|permission| has_permission(role, *permission))
}

/// True when every one of `permissions` is granted. An empty request is
/// vacuously satisfied.
pub fn has_all_permissions<'a, I>(role: Role, permissions: I) -> bool
where
    I: IntoIterator<Item = &'a Permission>,
{
    permissions
        .into_iter()
        .all(|permission| has_permission(role, *permission))
}

/// Permissions that open a page; holding any one of them is enough.
/// Unknown pages require nothing and are therefore never reachable.
pub fn page_requirements(page_id: &str) -> &'static [Permission] {
    match page_id {
        "dashboard" => &[ViewDashboard],
        "users" => &[ViewUsers],
        "settings" => &[ManageSettings],
        "analytics" => &[ViewAnalytics],
        _ => &[],
    }
}

/// Page identifiers with a configured requirement.
pub const PAGES: [&str; 4] = ["dashboard", "users", "settings", "analytics"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_permission_round_trips_through_its_id() {
        for p in Permission::ALL {
            assert_eq!(p.id().parse::<Permission>(), Ok(p));
        }
        assert!("View_Users".parse::<Permission>().is_err());
    }

    #[test]
    fn any_and_all_on_empty_requests() {
        let none: [Permission; 0] = [];
        for role in Role::ALL {
            assert!(!has_any_permission(role, &none));
            assert!(has_all_permissions(role, &none));
        }
    }

    #[test]
    fn any_matches_intersection() {
        for role in Role::ALL {
            for p in Permission::ALL {
                for q in Permission::ALL {
                    let request = [p, q];
                    let intersects = request.iter().any(|x| permissions_of(role).contains(x));
                    assert_eq!(has_any_permission(role, &request), intersects);
                }
            }
        }
    }

    #[test]
    fn all_requires_every_permission() {
        assert!(has_all_permissions(Role::User, &[ViewDashboard, ViewUsers]));
        assert!(!has_all_permissions(Role::User, &[ViewDashboard, EditUsers]));
        assert!(has_all_permissions(Role::SuperAdmin, &Permission::ALL));
    }

    #[test]
    fn viewer_cannot_view_users() {
        assert!(!has_permission(Role::Viewer, ViewUsers));
        assert!(has_permission(Role::Viewer, ViewDashboard));
    }

    #[test]
    fn configured_pages_have_requirements() {
        for page in PAGES {
            assert!(!page_requirements(page).is_empty(), "{page}");
        }
        assert!(page_requirements("nonexistent-page").is_empty());
        assert!(page_requirements("Dashboard").is_empty());
    }
}
