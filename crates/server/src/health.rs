use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tourguide_agent::AgentRuntime;

use crate::session::SessionStore;

#[derive(Clone)]
pub struct HealthState {
    runtime: Arc<AgentRuntime>,
    sessions: Arc<SessionStore>,
}

impl HealthState {
    pub fn new(runtime: Arc<AgentRuntime>, sessions: Arc<SessionStore>) -> Self {
        Self { runtime, sessions }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub polish: HealthCheck,
    pub active_sessions: usize,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.runtime);
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "tourguide-server runtime initialized".to_string(),
        },
        catalog,
        polish: polish_check(&state.runtime),
        active_sessions: state.sessions.len().await,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(runtime: &AgentRuntime) -> HealthCheck {
    match runtime.catalog().len() {
        0 => HealthCheck { status: "degraded", detail: "catalog has no places".to_string() },
        count => HealthCheck { status: "ready", detail: format!("{count} places loaded") },
    }
}

fn polish_check(runtime: &AgentRuntime) -> HealthCheck {
    match runtime.polisher_name() {
        Some(name) => HealthCheck { status: "ready", detail: format!("{name} polisher enabled") },
        None => HealthCheck { status: "ready", detail: "polish disabled".to_string() },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use tourguide_agent::AgentRuntime;
    use tourguide_core::{Catalog, PlaceEntry};

    use crate::health::{health, HealthState};
    use crate::session::SessionStore;

    fn state(entries: Vec<PlaceEntry>) -> HealthState {
        let catalog = Catalog::new(entries).expect("valid catalog");
        HealthState::new(
            Arc::new(AgentRuntime::new(Arc::new(catalog))),
            Arc::new(SessionStore::default()),
        )
    }

    #[tokio::test]
    async fn health_returns_ready_when_catalog_has_places() {
        let (status, Json(payload)) =
            health(State(state(vec![PlaceEntry::named("Kandy"), PlaceEntry::named("Ella")])))
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.detail, "2 places loaded");
        assert_eq!(payload.polish.detail, "polish disabled");
        assert_eq!(payload.active_sessions, 0);
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_for_empty_catalog() {
        let (status, Json(payload)) = health(State(state(Vec::new()))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.catalog.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
