use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use admin_rbac::jwt::JwtConfig;
use admin_rbac::{router, AppConfig, AppState};

fn setup() -> Result<(Router, AppState, JwtConfig)> {
    let jwt = JwtConfig::new("test-secret", 1);
    let state = AppState::new(AppConfig::new(jwt.clone()))?;
    let app = router(state.clone())?;
    Ok((app, state, jwt))
}

async fn send(app: &Router, req: Request<Body>) -> Result<(StatusCode, Value)> {
    let resp: Response = app.clone().oneshot(req).await?;
    let status = resp.status();
    let body_bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes)?
    };
    Ok((status, value))
}

fn get_role(token: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("GET")
        .uri("/me/role")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?)
}

fn put_role(token: &str, role: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("PUT")
        .uri("/me/role")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "role": role }).to_string()))?)
}

#[tokio::test]
async fn unregistered_identity_starts_as_user() -> Result<()> {
    let (app, _state, jwt) = setup()?;
    let token = jwt.encode("unregistered@x.com")?;

    let (status, v) = send(&app, get_role(&token)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["identifier"], "unregistered@x.com");
    assert_eq!(v["original_role"], "user");
    assert_eq!(v["current_role"], "user");
    assert_eq!(v["available_roles"], json!(["user", "viewer"]));
    assert_eq!(v["permissions"], json!(["view_dashboard", "view_users"]));

    Ok(())
}

#[tokio::test]
async fn manager_can_step_down_but_not_up() -> Result<()> {
    let (app, _state, jwt) = setup()?;
    let token = jwt.encode("test@example.com")?;

    let (status, v) = send(&app, put_role(&token, "admin")?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(v["error"], "forbidden");
    assert_eq!(v["message"], "You cannot switch to the Admin role");

    let (_, v) = send(&app, get_role(&token)?).await?;
    assert_eq!(v["current_role"], "manager", "denied switch must leave role unchanged");

    let (status, v) = send(&app, put_role(&token, "Viewer")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["current_role"], "viewer");
    assert_eq!(v["original_role"], "manager");

    let (_, v) = send(&app, get_role(&token)?).await?;
    assert_eq!(v["current_role"], "viewer");

    let (status, v) = send(&app, put_role(&token, "manager")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["current_role"], "manager");

    Ok(())
}

#[tokio::test]
async fn unknown_role_is_a_bad_request() -> Result<()> {
    let (app, _state, jwt) = setup()?;
    let token = jwt.encode("owner@example.com")?;

    let (status, v) = send(&app, put_role(&token, "root")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "bad_request");

    Ok(())
}

#[tokio::test]
async fn logout_drops_the_effective_role() -> Result<()> {
    let (app, state, jwt) = setup()?;
    let mut events = state.event_bus.subscribe();
    let token = jwt.encode("john.doe@example.com")?;

    let (status, _) = send(&app, put_role(&token, "user")?).await?;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .method("DELETE")
        .uri("/me/session")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?;
    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, v) = send(&app, get_role(&token)?).await?;
    assert_eq!(v["current_role"], "admin", "new session starts at the original role");

    let names: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|e| e["name"].as_str().map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec!["session.started", "role.switched", "session.ended", "session.started"]
    );

    Ok(())
}

#[tokio::test]
async fn requests_without_valid_token_are_unauthorized() -> Result<()> {
    let (app, _state, _jwt) = setup()?;

    let req = Request::builder().method("GET").uri("/me/role").body(Body::empty())?;
    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = JwtConfig::new("other-secret", 1).encode("owner@example.com")?;
    let (status, v) = send(&app, get_role(&forged)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(v["error"], "token");

    Ok(())
}
