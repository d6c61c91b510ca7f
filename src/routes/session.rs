//! Session endpoints: the caller's roles, role switching and logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{Permission, Principal, Role};
use crate::errors::{AppError, AppResult};
use crate::events::RequestContext;
use crate::jwt::AuthUser;
use crate::session::SwitchOutcome;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub identifier: String,
    pub original_role: Role,
    pub current_role: Role,
    /// Roles the caller may switch to.
    pub available_roles: Vec<Role>,
    /// Permissions of the current role.
    pub permissions: Vec<Permission>,
}

impl From<&Principal> for SessionView {
    fn from(principal: &Principal) -> Self {
        Self {
            identifier: principal.identifier.clone(),
            original_role: principal.original_role,
            current_role: principal.effective_role,
            available_roles: principal.available_roles(),
            permissions: principal.permissions().to_vec(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchRoleRequest {
    #[schema(example = "viewer")]
    pub role: String,
}

#[utoipa::path(
    get,
    path = "/me/role",
    tag = "Session",
    responses(
        (status = 200, description = "Current session roles", body = SessionView),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn current_role(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<SessionView>> {
    let principal = state.sessions.resume(&auth.identifier).await;
    Ok(Json(SessionView::from(&principal)))
}

#[utoipa::path(
    put,
    path = "/me/role",
    tag = "Session",
    request_body = SwitchRoleRequest,
    responses(
        (status = 200, description = "Role switched", body = SessionView),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Switch not allowed; current role unchanged")
    ),
    security(("bearerAuth" = []))
)]
pub async fn switch_role(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<SwitchRoleRequest>,
) -> AppResult<Json<SessionView>> {
    let target: Role = payload.role.parse()?;
    let context = RequestContext::from_headers(&headers);

    match state.sessions.switch_role(&auth.identifier, target, Some(context)).await {
        SwitchOutcome::Switched(principal) => Ok(Json(SessionView::from(&principal))),
        SwitchOutcome::Denied(_) => Err(AppError::forbidden(format!(
            "You cannot switch to the {} role",
            target.label()
        ))),
    }
}

#[utoipa::path(
    delete,
    path = "/me/session",
    tag = "Session",
    responses((status = 204, description = "Session ended")),
    security(("bearerAuth" = []))
)]
pub async fn end_session(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    state.sessions.end(&auth.identifier).await;
    Ok(StatusCode::NO_CONTENT)
}
