use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;

use crate::app::AppState;
use crate::authz::{ManageAction, MatchMode, Permission, Role};
use crate::routes;

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::roles::list_roles,
		routes::session::current_role,
		routes::session::switch_role,
		routes::session::end_session,
		routes::access::check_page,
		routes::access::check_permissions,
		routes::access::check_manage
	),
	components(
		schemas(
			Role,
			Permission,
			ManageAction,
			MatchMode,
			routes::health::HealthResponse,
			routes::roles::RoleInfo,
			routes::session::SessionView,
			routes::session::SwitchRoleRequest,
			routes::access::AccessDecision,
			routes::access::PageDecision,
			routes::access::PermissionCheckRequest,
			routes::access::ManageCheckRequest
		)
	),
	tags(
		(name = "Health", description = "Service health"),
		(name = "Roles", description = "Role registry"),
		(name = "Session", description = "Current and original roles of the caller"),
		(name = "Access", description = "Page, permission and management checks")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<Value> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	ensure_security_components(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(doc)
}

pub fn docs_routes(doc: Value) -> Router<AppState> {
	let doc = Arc::new(doc);
	Router::new().route(
		"/api-docs/openapi.json",
		get(move || {
			let doc = Arc::clone(&doc);
			async move { Json((*doc).clone()) }
		}),
	)
}

fn ensure_security_components(doc: &mut Value) {
	let Some(root) = doc.as_object_mut() else {
		return;
	};

	let components = root
		.entry("components")
		.or_insert_with(|| Value::Object(Map::new()));
	let Some(components) = components.as_object_mut() else {
		return;
	};

	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()));
	if let Some(schemes) = schemes.as_object_mut() {
		schemes.insert(
			"bearerAuth".to_string(),
			json!({
				"type": "http",
				"scheme": "bearer",
				"bearerFormat": "JWT"
			}),
		);
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let server_url = format!("http://localhost:{}", port);

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr.iter().any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn document_lists_paths_and_bearer_scheme() {
		let doc = build_openapi(8000).unwrap();
		let paths = doc["paths"].as_object().unwrap();
		assert!(paths.contains_key("/me/role"));
		assert!(paths.contains_key("/access/pages/{page}"));
		assert_eq!(doc["components"]["securitySchemes"]["bearerAuth"]["scheme"], "bearer");
		assert_eq!(doc["servers"][0]["url"], "http://localhost:8000");
	}
}
