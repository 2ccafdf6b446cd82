//! In-memory session service. Sessions are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, SupportError};
use crate::types::event::Event;

use super::{apply_state_delta, CreateSessionRequest, Session, SessionKey, SessionService};

type UserSessions = HashMap<String, HashMap<String, Session>>;

/// Session service backed by nested maps: app -> user -> session id.
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<String, UserSessions>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions stored across all apps and users.
    pub async fn len(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .flat_map(|users| users.values())
            .map(HashMap::len)
            .sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn not_found(key: &SessionKey) -> SupportError {
    SupportError::session_not_found(&key.app_name, &key.user_id, &key.session_id)
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<Session> {
        let session_id = request
            .session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.generate_id());

        let mut sessions = self.sessions.write().await;
        let user_sessions = sessions
            .entry(request.app_name.clone())
            .or_default()
            .entry(request.user_id.clone())
            .or_default();

        if user_sessions.contains_key(&session_id) {
            return Err(SupportError::SessionAlreadyExists {
                app_name: request.app_name,
                user_id: request.user_id,
                session_id,
            });
        }

        let session = Session {
            id: session_id.clone(),
            app_name: request.app_name,
            user_id: request.user_id,
            state: request.state.unwrap_or_default(),
            events: Vec::new(),
            last_update_time: Utc::now(),
        };
        user_sessions.insert(session_id, session.clone());

        debug!(
            app = %session.app_name,
            user = %session.user_id,
            session = %session.id,
            "session created"
        );
        Ok(session)
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&key.app_name)
            .and_then(|users| users.get(&key.user_id))
            .and_then(|user_sessions| user_sessions.get(&key.session_id))
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut listed: Vec<Session> = sessions
            .get(app_name)
            .and_then(|users| users.get(user_id))
            .map(|user_sessions| {
                user_sessions
                    .values()
                    .map(|s| Session {
                        events: Vec::new(),
                        ..s.clone()
                    })
                    .collect()
            })
            .unwrap_or_default();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listed)
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions
            .get_mut(&key.app_name)
            .and_then(|users| users.get_mut(&key.user_id))
            .and_then(|user_sessions| user_sessions.remove(&key.session_id));

        match removed {
            Some(_) => {
                debug!(session = %key.session_id, "session deleted");
                Ok(())
            }
            None => Err(not_found(key)),
        }
    }

    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<Event> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&key.app_name)
            .and_then(|users| users.get_mut(&key.user_id))
            .and_then(|user_sessions| user_sessions.get_mut(&key.session_id))
            .ok_or_else(|| not_found(key))?;

        if event.partial {
            return Ok(event);
        }

        apply_state_delta(&mut session.state, &event.actions.state_delta);
        session.last_update_time = event.timestamp.max(session.last_update_time);
        session.events.push(event.clone());

        debug!(
            session = %key.session_id,
            author = %event.author,
            delta_keys = event.actions.state_delta.len(),
            "event appended"
        );
        Ok(event)
    }
}
