use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tourguide_agent::AgentRuntime;
use tourguide_core::audit::AuditContext;
use tourguide_core::flows::ConversationState;
use tourguide_core::places::{search, SearchHit};
use tourguide_core::{ApplicationError, InterfaceError};
use uuid::Uuid;

use crate::session::SessionStore;

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<AgentRuntime>,
    sessions: Arc<SessionStore>,
}

impl ChatState {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime, sessions: Arc::new(SessionStore::default()) }
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotsResponse {
    pub city: Option<String>,
    pub minutes: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResetResponse {
    pub session_id: String,
    pub reset: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
        };
        tracing::warn!(
            event_name = "server.request.rejected",
            correlation_id = %self.0.correlation_id(),
            error = %self.0,
            "request rejected"
        );
        let body = ErrorBody {
            error,
            message: self.0.user_message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/state", get(session_slots))
        .route("/reset", post(reset))
        .route("/places", get(places))
        .route("/search", get(search_places))
        .with_state(state)
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let session_id = match request.session_id.as_deref().map(str::trim) {
        Some(session_id) if !session_id.is_empty() => session_id.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let audit = AuditContext::new(Some(session_id.clone()), correlation_id, "chat");
    let slot = state.sessions.get_or_create(&session_id).await;
    let mut conversation = slot.lock().await;
    let turn = state.runtime.handle_turn(&request.message, &conversation, &audit).await;
    *conversation = turn.state;
    drop(conversation);
    state.sessions.release_if_idle(&session_id, &slot).await;

    Ok(Json(ChatResponse { session_id, reply: turn.reply, suggestions: turn.suggestions }))
}

pub async fn session_slots(
    State(state): State<ChatState>,
    Query(query): Query<SessionQuery>,
) -> Json<SlotsResponse> {
    let slots = match state.sessions.get(&query.session_id).await {
        Some(slot) => slot.lock().await.slots(),
        None => ConversationState::default().slots(),
    };
    Json(SlotsResponse { city: slots.city, minutes: slots.minutes })
}

pub async fn reset(
    State(state): State<ChatState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let session_id = request.session_id.trim().to_string();
    if session_id.is_empty() {
        return Err(ApplicationError::InvalidInput("session_id must not be empty".to_string())
            .into_interface(correlation_id)
            .into());
    }

    let Some(slot) = state.sessions.get(&session_id).await else {
        return Ok(Json(ResetResponse { session_id, reset: false }));
    };
    let audit = AuditContext::new(Some(session_id.clone()), correlation_id, "chat");
    let mut conversation = slot.lock().await;
    *conversation = state.runtime.reset(&conversation, &audit);
    drop(conversation);
    state.sessions.release_if_idle(&session_id, &slot).await;

    Ok(Json(ResetResponse { session_id, reset: true }))
}

fn ensure_catalog(state: &ChatState) -> Result<(), ApiError> {
    if state.runtime.catalog().is_empty() {
        return Err(ApplicationError::CatalogUnavailable("catalog has no places".to_string())
            .into_interface(Uuid::new_v4().to_string())
            .into());
    }
    Ok(())
}

pub async fn places(State(state): State<ChatState>) -> Result<Json<Vec<String>>, ApiError> {
    ensure_catalog(&state)?;
    let names =
        state.runtime.catalog().list_places().into_iter().map(str::to_string).collect::<Vec<_>>();
    Ok(Json(names))
}

pub async fn search_places(
    State(state): State<ChatState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    ensure_catalog(&state)?;
    Ok(Json(search(state.runtime.catalog(), &query.q)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::{Query, State},
        http::{Request, StatusCode},
        response::IntoResponse,
        Json,
    };
    use tourguide_agent::AgentRuntime;
    use tourguide_core::audit::InMemoryAuditSink;
    use tourguide_core::{Catalog, PlaceEntry, Stop};
    use tower::ServiceExt;

    use super::{
        chat, places, reset, router, search_places, session_slots, ChatRequest, ChatState,
        ResetRequest, SearchQuery, SessionQuery,
    };

    fn state() -> ChatState {
        let catalog = Catalog::new(vec![
            PlaceEntry::named("Sigiriya")
                .with_city("Dambulla")
                .with_highlights(["rock fortress"])
                .with_facts(["Fifth-century citadel"]),
            PlaceEntry::named("Kandy").with_stops(vec![
                Stop::new("Temple of the Tooth", 60),
                Stop::new("Kandy Lake", 45),
            ]),
        ])
        .expect("valid catalog");
        let runtime = AgentRuntime::new(Arc::new(catalog))
            .with_audit_sink(Arc::new(InMemoryAuditSink::default()));
        ChatState::new(Arc::new(runtime))
    }

    fn message(session_id: &str, text: &str) -> Json<ChatRequest> {
        Json(ChatRequest { session_id: Some(session_id.to_string()), message: text.to_string() })
    }

    #[tokio::test]
    async fn chat_keeps_slot_filling_per_session() {
        let state = state();

        let Json(first) = chat(State(state.clone()), message("s-1", "plan a tour"))
            .await
            .expect("first turn");
        assert_eq!(first.session_id, "s-1");
        assert_eq!(first.suggestions, vec!["Kandy", "Galle", "Ella", "Sigiriya"]);

        let _ = chat(State(state.clone()), message("s-1", "Kandy")).await.expect("second turn");
        let Json(slots) = session_slots(
            State(state.clone()),
            Query(SessionQuery { session_id: "s-1".to_string() }),
        )
        .await;
        assert_eq!(slots.city.as_deref(), Some("Kandy"));

        // a different session is unaffected by s-1's pending slot
        let Json(other) =
            chat(State(state.clone()), message("s-2", "Kandy")).await.expect("other session");
        assert!(other.reply.starts_with("**Kandy**No facts."));

        let Json(done) =
            chat(State(state.clone()), message("s-1", "2 hours")).await.expect("third turn");
        assert!(done.reply.starts_with("**Kandy — 105/120 min**"));
    }

    #[tokio::test]
    async fn chat_assigns_session_when_missing() {
        let Json(response) = chat(
            State(state()),
            Json(ChatRequest { session_id: None, message: "hello".to_string() }),
        )
        .await
        .expect("turn");
        assert!(!response.session_id.is_empty());
        assert!(response.reply.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn blank_message_gets_the_welcome_reply() {
        let Json(response) =
            chat(State(state()), message("s-1", "   ")).await.expect("blank turn");
        assert!(response.reply.starts_with("Hi! I am your Virtual Tour Guide."));
    }

    #[tokio::test]
    async fn idle_sessions_are_not_retained() {
        let state = state();
        for _ in 0..3 {
            let _ = chat(
                State(state.clone()),
                Json(ChatRequest { session_id: None, message: "hello".to_string() }),
            )
            .await
            .expect("stateless turn");
        }
        assert_eq!(state.sessions().len().await, 0);

        let _ = chat(State(state.clone()), message("s-p", "plan a tour")).await.expect("turn");
        assert_eq!(state.sessions().len().await, 1);
        let _ = chat(State(state.clone()), message("s-p", "Kandy")).await.expect("turn");
        let _ = chat(State(state.clone()), message("s-p", "2 hours")).await.expect("turn");
        assert_eq!(state.sessions().len().await, 0);
    }

    #[tokio::test]
    async fn blank_reset_session_is_a_bad_request() {
        let error = reset(State(state()), Json(ResetRequest { session_id: "  ".to_string() }))
            .await
            .expect_err("rejected");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reset_clears_pending_city() {
        let state = state();
        let _ = chat(State(state.clone()), message("s-9", "plan a tour")).await.expect("turn");
        let _ = chat(State(state.clone()), message("s-9", "Kandy")).await.expect("turn");

        let Json(reset_response) = reset(
            State(state.clone()),
            Json(ResetRequest { session_id: "s-9".to_string() }),
        )
        .await
        .expect("reset");
        assert!(reset_response.reset);
        assert_eq!(state.sessions().len().await, 0);

        let Json(slots) =
            session_slots(State(state), Query(SessionQuery { session_id: "s-9".to_string() }))
                .await;
        assert_eq!(slots.city, None);
        assert_eq!(slots.minutes, None);
    }

    #[tokio::test]
    async fn places_and_search_read_the_catalog() {
        let state = state();
        let Json(names) = places(State(state.clone())).await.expect("places");
        assert_eq!(names, vec!["Kandy", "Sigiriya"]);

        let Json(hits) =
            search_places(State(state), Query(SearchQuery { q: "rock fortress".to_string() }))
                .await
                .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sigiriya");
    }

    #[tokio::test]
    async fn router_serves_chat_as_json() {
        let response = router(state())
            .oneshot(
                Request::post("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"session_id":"s-r","message":"Sigiriya"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["session_id"], "s-r");
        assert!(payload["reply"].as_str().is_some_and(|reply| reply.starts_with("**Sigiriya**")));
        assert_eq!(payload["suggestions"][0], "Plan a 2-hour tour in Sigiriya");
    }

    #[tokio::test]
    async fn empty_catalog_answers_unavailable_with_user_message() {
        let runtime = AgentRuntime::new(Arc::new(Catalog::new(Vec::new()).expect("empty catalog")))
            .with_audit_sink(Arc::new(InMemoryAuditSink::default()));
        let response = router(ChatState::new(Arc::new(runtime)))
            .oneshot(Request::get("/places").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["error"], "service_unavailable");
        assert_eq!(
            payload["message"],
            "The service is temporarily unavailable. Please retry shortly."
        );
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
