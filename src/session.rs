//! Session-scoped effective roles.
//!
//! The store only remembers which role a principal is currently acting as.
//! Original roles are never stored; they are re-resolved from the identifier
//! on every resume, and a stored role is trusted only after it passes the
//! switch check against that original role.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::authz::{Principal, Role, RoleResolver};
use crate::events::{log_activity_with_context, EventBus, RequestContext, RoleSwitch, SessionActivity};

/// Storage for effective roles keyed by identifier.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, identifier: &str) -> Option<Role>;

    async fn save(&self, identifier: &str, role: Role);

    /// Returns the removed role, if an entry existed.
    async fn remove(&self, identifier: &str) -> Option<Role>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    roles: RwLock<HashMap<String, Role>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, identifier: &str) -> Option<Role> {
        self.roles.read().await.get(identifier).copied()
    }

    async fn save(&self, identifier: &str, role: Role) {
        self.roles.write().await.insert(identifier.to_string(), role);
    }

    async fn remove(&self, identifier: &str) -> Option<Role> {
        self.roles.write().await.remove(identifier)
    }
}

/// Result of a role switch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched(Principal),
    /// The principal is unchanged.
    Denied(Principal),
}

/// Coordinates session state on top of a [`SessionStore`].
///
/// Every read-check-write sequence (resume, switch, end) runs under one
/// mutation lock, so a logout can never be undone by a switch that loaded the
/// session before the logout and saved after it.
#[derive(Clone)]
pub struct SessionManager {
    resolver: Arc<RoleResolver>,
    store: Arc<dyn SessionStore>,
    event_bus: EventBus,
    mutation: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new(resolver: Arc<RoleResolver>, store: Arc<dyn SessionStore>, event_bus: EventBus) -> Self {
        Self {
            resolver,
            store,
            event_bus,
            mutation: Arc::new(Mutex::new(())),
        }
    }

    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    /// Restores (or starts) the session for `identifier`.
    pub async fn resume(&self, identifier: &str) -> Principal {
        let _guard = self.mutation.lock().await;
        self.resume_locked(identifier).await
    }

    async fn resume_locked(&self, identifier: &str) -> Principal {
        let original_role = self.resolver.resolve_original_role(identifier);
        let stored = self.store.load(identifier).await;
        let principal = Principal::resume(identifier, original_role, stored);

        if stored != Some(principal.effective_role) {
            self.store.save(identifier, principal.effective_role).await;
            if stored.is_none() {
                log_activity_with_context(
                    &self.event_bus,
                    "started",
                    Some(identifier),
                    &SessionActivity {
                        identifier: identifier.to_string(),
                        original_role,
                        effective_role: principal.effective_role,
                    },
                    None,
                );
            }
        }

        principal
    }

    pub async fn switch_role(
        &self,
        identifier: &str,
        target: Role,
        context: Option<RequestContext>,
    ) -> SwitchOutcome {
        let _guard = self.mutation.lock().await;
        let mut principal = self.resume_locked(identifier).await;
        let event = RoleSwitch {
            identifier: identifier.to_string(),
            from: principal.effective_role,
            requested: target,
        };

        if !principal.switch_role(target) {
            tracing::info!(
                identifier = %identifier,
                original = %principal.original_role,
                requested = %target,
                "role switch denied"
            );
            log_activity_with_context(&self.event_bus, "switch_denied", Some(identifier), &event, context);
            return SwitchOutcome::Denied(principal);
        }

        self.store.save(identifier, principal.effective_role).await;
        tracing::info!(identifier = %identifier, from = %event.from, to = %target, "role switched");
        log_activity_with_context(&self.event_bus, "switched", Some(identifier), &event, context);
        SwitchOutcome::Switched(principal)
    }

    /// Ends the session; the effective role association is removed entirely.
    pub async fn end(&self, identifier: &str) -> bool {
        let _guard = self.mutation.lock().await;
        let Some(effective_role) = self.store.remove(identifier).await else {
            return false;
        };

        log_activity_with_context(
            &self.event_bus,
            "ended",
            Some(identifier),
            &SessionActivity {
                identifier: identifier.to_string(),
                original_role: self.resolver.resolve_original_role(identifier),
                effective_role,
            },
            None,
        );
        true
    }
}
