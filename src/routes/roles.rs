use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::authz::Role;
use crate::errors::AppResult;

/// Public description of a role. Authority levels are not exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleInfo {
    pub id: Role,
    pub label: &'static str,
}

impl From<Role> for RoleInfo {
    fn from(role: Role) -> Self {
        Self {
            id: role,
            label: role.label(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/roles",
    tag = "Roles",
    responses((status = 200, description = "Known roles, highest authority first", body = Vec<RoleInfo>))
)]
pub async fn list_roles() -> AppResult<Json<Vec<RoleInfo>>> {
    Ok(Json(Role::ALL.into_iter().map(RoleInfo::from).collect()))
}
