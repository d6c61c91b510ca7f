use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::authz::Role;

pub mod loggable;
pub use loggable::{Loggable, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<T> {
    pub id: Uuid,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
    pub actor_id: Option<String>,
    pub subject_id: Option<String>,
    pub payload: T,
}

impl<T> DomainEvent<T> {
    pub fn new(name: impl Into<String>, actor_id: Option<String>, subject_id: Option<String>, payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            occurred_at: Utc::now(),
            actor_id,
            subject_id,
            payload,
        }
    }
}

pub type EventBus = broadcast::Sender<Value>;

pub fn init_event_bus() -> (EventBus, broadcast::Receiver<Value>) {
    broadcast::channel(1024)
}

/// Request context for activity events (IP, User-Agent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from)
            });

        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self { ip, user_agent }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPayload {
    #[serde(rename = "new")]
    pub current: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RequestContext>,
    pub severity: Severity,
}

/// Session lifecycle of a principal.
#[derive(Debug, Clone, Serialize)]
pub struct SessionActivity {
    pub identifier: String,
    pub original_role: Role,
    pub effective_role: Role,
}

impl Loggable for SessionActivity {
    fn entity_type() -> &'static str {
        "session"
    }

    fn subject_id(&self) -> String {
        self.identifier.clone()
    }
}

/// An attempted change of effective role.
#[derive(Debug, Clone, Serialize)]
pub struct RoleSwitch {
    pub identifier: String,
    pub from: Role,
    pub requested: Role,
}

impl Loggable for RoleSwitch {
    fn entity_type() -> &'static str {
        "role"
    }

    fn subject_id(&self) -> String {
        self.identifier.clone()
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }
}

pub fn log_activity<T: Loggable>(event_bus: &EventBus, action: &str, actor_id: Option<&str>, entity: &T) {
    log_activity_with_context(event_bus, action, actor_id, entity, None);
}

/// Publishes `<entity_type>.<action>` on the bus. Publishing never fails the
/// caller; with no subscribers the event is dropped.
pub fn log_activity_with_context<T: Loggable>(
    event_bus: &EventBus,
    action: &str,
    actor_id: Option<&str>,
    entity: &T,
    context: Option<RequestContext>,
) {
    let event_name = format!("{}.{}", T::entity_type(), action);

    let payload = ActivityPayload {
        current: serde_json::to_value(entity).unwrap_or_default(),
        context,
        severity: entity.severity_for_action(action),
    };

    let event = DomainEvent::new(
        event_name,
        actor_id.map(str::to_string),
        Some(entity.subject_id()),
        serde_json::to_value(&payload).unwrap_or_default(),
    );

    let _ = event_bus.send(serde_json::to_value(event).unwrap_or_default());
}

/// Drains the bus into structured log records until every sender is gone.
pub async fn start_activity_listener(mut rx: broadcast::Receiver<Value>) {
    tracing::info!("Activity listener started");
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "activity listener lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let name = event.get("name").and_then(|v| v.as_str()).unwrap_or("unknown");
        let subject = event.get("subject_id").and_then(|v| v.as_str()).unwrap_or("-");
        let severity = event
            .get("payload")
            .and_then(|p| p.get("severity"))
            .and_then(|s| s.as_str())
            .unwrap_or("important");

        let description = match name {
            "session.started" => "Session started",
            "session.ended" => "Session ended",
            "role.switched" => "Effective role switched",
            "role.switch_denied" => "Role switch denied",
            _ => "System event",
        };

        match severity {
            "critical" => tracing::warn!(event = %name, subject = %subject, "{}", description),
            _ => tracing::info!(event = %name, subject = %subject, "{}", description),
        }
    }
    tracing::info!("Activity listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_and_severity_follow_action() {
        let (bus, mut rx) = init_event_bus();
        let switch = RoleSwitch {
            identifier: "test@example.com".to_string(),
            from: Role::Manager,
            requested: Role::Admin,
        };
        log_activity(&bus, "switch_denied", Some("test@example.com"), &switch);

        let event = rx.try_recv().unwrap();
        assert_eq!(event["name"], "role.switch_denied");
        assert_eq!(event["subject_id"], "test@example.com");
        assert_eq!(event["payload"]["severity"], "critical");
        assert_eq!(event["payload"]["new"]["requested"], "admin");
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let (bus, rx) = init_event_bus();
        drop(rx);
        let activity = SessionActivity {
            identifier: "a@example.com".to_string(),
            original_role: Role::User,
            effective_role: Role::User,
        };
        log_activity(&bus, "started", None, &activity);
    }

    #[test]
    fn request_context_prefers_forwarded_for() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());
        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.ip.as_deref(), Some("10.0.0.1"));
        assert!(ctx.user_agent.is_none());
    }
}
