//! Session storage: the record of one user's conversation with an app.

pub mod history;
pub mod memory;

pub use history::{add_agent_response_to_history, add_user_query_to_history, render_state};
pub use memory::InMemorySessionService;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
pub use crate::types::event::State;
use crate::types::event::Event;

/// State key holding the display name of the user.
pub const USER_NAME_KEY: &str = "user_name";
/// State key holding the list of purchased courses.
pub const PURCHASED_COURSES_KEY: &str = "purchased_courses";
/// State key holding the interaction log.
pub const INTERACTION_HISTORY_KEY: &str = "interaction_history";

/// Prefix for state keys that live only for the current invocation.
pub const TEMP_PREFIX: &str = "temp:";

/// Suffix appended to a user id to form its deterministic session id.
pub const MAIN_SESSION_SUFFIX: &str = "_main_session";

/// Fully-qualified identity of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Key of the deterministic main session for `user_id`.
    pub fn main_session(app_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let session_id = main_session_id(&user_id);
        Self::new(app_name, user_id, session_id)
    }
}

/// Deterministic session id used so a returning user resumes the same session.
pub fn main_session_id(user_id: &str) -> String {
    format!("{user_id}{MAIN_SESSION_SUFFIX}")
}

/// A user's conversation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub events: Vec<Event>,
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.app_name, &self.user_id, &self.id)
    }

    /// The `user_name` state value, falling back to `default` when absent or not a string.
    pub fn user_name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.state
            .get(USER_NAME_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// State every new session starts with.
pub fn initial_state(user_name: &str) -> State {
    let mut state = State::new();
    state.insert(USER_NAME_KEY.into(), user_name.into());
    state.insert(PURCHASED_COURSES_KEY.into(), serde_json::Value::Array(Vec::new()));
    state.insert(INTERACTION_HISTORY_KEY.into(), serde_json::Value::Array(Vec::new()));
    state
}

/// Merge a state delta into `state`, dropping invocation-scoped keys.
pub fn apply_state_delta(state: &mut State, delta: &State) {
    for (key, value) in delta {
        if key.starts_with(TEMP_PREFIX) {
            continue;
        }
        state.insert(key.clone(), value.clone());
    }
}

/// Parameters for [`SessionService::create_session`].
#[derive(Debug, Clone, Default)]
pub struct CreateSessionRequest {
    pub app_name: String,
    pub user_id: String,
    /// Explicit session id; a generated one is used when `None`.
    pub session_id: Option<String>,
    pub state: Option<State>,
}

impl CreateSessionRequest {
    pub fn new(app_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }
}

/// Storage backend for sessions.
///
/// `get_session` reports a missing session as
/// [`SupportError::SessionNotFound`](crate::error::SupportError::SessionNotFound)
/// so callers can tell "create one" apart from a broken backend.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a new session. Fails if the id is already taken.
    async fn create_session(&self, request: CreateSessionRequest) -> Result<Session>;

    /// Fetch a snapshot of a session, including its events.
    async fn get_session(&self, key: &SessionKey) -> Result<Session>;

    /// List a user's sessions (without events).
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>>;

    /// Remove a session.
    async fn delete_session(&self, key: &SessionKey) -> Result<()>;

    /// Append an event and apply its state delta.
    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<Event>;

    /// Produce a fresh unique identifier.
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
