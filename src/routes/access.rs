//! Advisory access checks for the caller's current role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{ManageAction, MatchMode, Permission, Role};
use crate::errors::AppResult;
use crate::jwt::AuthUser;

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessDecision {
    pub allowed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageDecision {
    pub page: String,
    pub allowed: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionCheckRequest {
    #[schema(example = json!(["view_users", "export_data"]))]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManageCheckRequest {
    #[schema(example = "user")]
    pub target_role: String,
    pub action: ManageAction,
}

#[utoipa::path(
    get,
    path = "/access/pages/{page}",
    tag = "Access",
    params(("page" = String, Path, description = "Page identifier, e.g. dashboard")),
    responses((status = 200, description = "Page decision", body = PageDecision)),
    security(("bearerAuth" = []))
)]
pub async fn check_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(page): Path<String>,
) -> AppResult<Json<PageDecision>> {
    let principal = state.sessions.resume(&auth.identifier).await;
    let allowed = state.evaluator.can_access_page(&principal, &page);
    Ok(Json(PageDecision { page, allowed }))
}

#[utoipa::path(
    post,
    path = "/access/permissions",
    tag = "Access",
    request_body = PermissionCheckRequest,
    responses(
        (status = 200, description = "Permission decision", body = AccessDecision),
        (status = 400, description = "Unknown permission")
    ),
    security(("bearerAuth" = []))
)]
pub async fn check_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PermissionCheckRequest>,
) -> AppResult<Json<AccessDecision>> {
    let permissions = payload
        .permissions
        .iter()
        .map(|p| p.parse::<Permission>())
        .collect::<Result<Vec<_>, _>>()?;

    let principal = state.sessions.resume(&auth.identifier).await;
    let allowed = state.evaluator.can_with(&principal, &permissions, payload.mode);
    Ok(Json(AccessDecision { allowed }))
}

#[utoipa::path(
    post,
    path = "/access/manage",
    tag = "Access",
    request_body = ManageCheckRequest,
    responses(
        (status = 204, description = "Action allowed"),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Action not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn check_manage(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ManageCheckRequest>,
) -> AppResult<StatusCode> {
    let target: Role = payload.target_role.parse()?;
    let principal = state.sessions.resume(&auth.identifier).await;
    state
        .evaluator
        .ensure_can_manage(&principal, target, payload.action)?;
    Ok(StatusCode::NO_CONTENT)
}
