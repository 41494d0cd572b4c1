use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tourguide_core::flows::ConversationState;

/// One lock per conversation, so turns of the same session run one at a time
/// while different sessions proceed in parallel.
pub type SessionSlot = Arc<Mutex<ConversationState>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionSlot>>,
}

impl SessionStore {
    pub async fn get(&self, session_id: &str) -> Option<SessionSlot> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn get_or_create(&self, session_id: &str) -> SessionSlot {
        if let Some(slot) = self.get(session_id).await {
            return slot;
        }
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    /// Drops the entry once its conversation is back to idle. Skipped while any
    /// other request still holds the slot.
    pub async fn release_if_idle(&self, session_id: &str, slot: &SessionSlot) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(stored) = sessions.get(session_id) else {
            return false;
        };
        // one reference in the map, one held by the caller
        if !Arc::ptr_eq(stored, slot) || Arc::strong_count(slot) > 2 {
            return false;
        }
        let idle = slot.try_lock().is_ok_and(|state| state.is_idle());
        if idle {
            sessions.remove(session_id);
        }
        idle
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
