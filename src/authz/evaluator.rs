use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

use super::permission::{has_all_permissions, has_any_permission, has_permission, Permission};
use super::policy;
use super::principal::Principal;
use super::role::Role;

/// Management action performed on another principal's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ManageAction {
    Edit,
    Delete,
}

impl ManageAction {
    pub fn verb(self) -> &'static str {
        match self {
            ManageAction::Edit => "edit",
            ManageAction::Delete => "delete",
        }
    }

    fn required_permission(self) -> Permission {
        match self {
            ManageAction::Edit => Permission::EditUsers,
            ManageAction::Delete => Permission::DeleteUsers,
        }
    }
}

/// How a set of requested permissions is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Any,
    All,
}

/// Policy evaluator trait for pluggable authorization logic.
///
/// Every check is evaluated against the principal's effective role.
pub trait PolicyEvaluator: Send + Sync {
    fn can(&self, principal: &Principal, permission: Permission) -> bool;

    fn can_with(&self, principal: &Principal, permissions: &[Permission], mode: MatchMode) -> bool;

    fn can_access_page(&self, principal: &Principal, page_id: &str) -> bool;

    fn can_manage(&self, principal: &Principal, target: Role) -> bool;

    /// Turns a management denial into a `Forbidden` error whose message names
    /// the action only.
    fn ensure_can_manage(
        &self,
        principal: &Principal,
        target: Role,
        action: ManageAction,
    ) -> AppResult<()> {
        if self.can(principal, action.required_permission()) && self.can_manage(principal, target) {
            return Ok(());
        }
        Err(AppError::forbidden(format!(
            "You do not have permission to {} users",
            action.verb()
        )))
    }
}

/// Default evaluator backed by the static role tables.
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicyEvaluator;

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn can(&self, principal: &Principal, permission: Permission) -> bool {
        let allowed = has_permission(principal.effective_role, permission);
        tracing::debug!(
            identifier = %principal.identifier,
            role = %principal.effective_role,
            permission = %permission,
            allowed,
            "permission check"
        );
        allowed
    }

    fn can_with(&self, principal: &Principal, permissions: &[Permission], mode: MatchMode) -> bool {
        let role = principal.effective_role;
        let allowed = match mode {
            MatchMode::Any => has_any_permission(role, permissions),
            MatchMode::All => has_all_permissions(role, permissions),
        };
        tracing::debug!(
            identifier = %principal.identifier,
            role = %role,
            mode = ?mode,
            requested = permissions.len(),
            allowed,
            "composite permission check"
        );
        allowed
    }

    fn can_access_page(&self, principal: &Principal, page_id: &str) -> bool {
        let allowed = policy::can_access_page(principal.effective_role, page_id);
        tracing::debug!(
            identifier = %principal.identifier,
            role = %principal.effective_role,
            page = %page_id,
            allowed,
            "page access check"
        );
        allowed
    }

    fn can_manage(&self, principal: &Principal, target: Role) -> bool {
        let allowed = policy::can_manage(principal.effective_role, target);
        tracing::debug!(
            identifier = %principal.identifier,
            role = %principal.effective_role,
            target = %target,
            allowed,
            "management check"
        );
        allowed
    }
}
