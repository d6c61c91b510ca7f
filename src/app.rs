use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{verify_permission_hierarchy, DefaultPolicyEvaluator, PolicyEvaluator};
use crate::config::AppConfig;
use crate::docs;
use crate::errors::AppError;
use crate::events::{init_event_bus, EventBus};
use crate::routes::{access, health, roles, session};
use crate::session::{InMemorySessionStore, SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionManager,
    pub evaluator: Arc<dyn PolicyEvaluator>,
    pub event_bus: EventBus,
}

impl AppState {
    /// Validates the role tables and builds shared state. Fails on any
    /// configuration problem so a misconfigured service never starts.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        verify_permission_hierarchy().map_err(|err| AppError::configuration(err.to_string()))?;

        let resolver = Arc::new(config.resolver.build()?);
        let (event_bus, _) = init_event_bus();
        let sessions = SessionManager::new(resolver, Arc::new(InMemorySessionStore::new()), event_bus.clone());

        Ok(Self {
            config: Arc::new(config),
            sessions,
            evaluator: Arc::new(DefaultPolicyEvaluator::new()),
            event_bus,
        })
    }
}

pub fn create_app(config: AppConfig) -> Result<Router, AppError> {
    let state = AppState::new(config)?;
    router(state)
}

pub fn router(state: AppState) -> Result<Router, AppError> {
    let openapi = docs::build_openapi(state.config.port)?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let me_routes = Router::new()
        .route("/role", get(session::current_role).put(session::switch_role))
        .route("/session", axum::routing::delete(session::end_session));

    let access_routes = Router::new()
        .route("/pages/:page", get(access::check_page))
        .route("/permissions", post(access::check_permissions))
        .route("/manage", post(access::check_manage));

    let router = Router::new()
        .route("/api/health", get(health::health))
        .route("/roles", get(roles::list_roles))
        .nest("/me", me_routes)
        .nest("/access", access_routes)
        .merge(docs::docs_routes(openapi))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
