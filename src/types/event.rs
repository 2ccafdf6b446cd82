//! Session events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::ModelMessage;

/// Ordered key-value session state.
pub type State = serde_json::Map<String, serde_json::Value>;

/// Author recorded on events produced by the human user.
pub const USER_AUTHOR: &str = "user";

/// Author recorded on bookkeeping events that only carry a state delta.
pub const SYSTEM_AUTHOR: &str = "system";

/// Side effects carried by an event.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EventActions {
    /// Keys to overwrite in the session state when the event is appended.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub state_delta: State,
}

/// A single entry in a session's event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub invocation_id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ModelMessage>,
    #[serde(default)]
    pub actions: EventActions,
    #[serde(default)]
    pub partial: bool,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create an empty event attributed to `author`.
    pub fn new(invocation_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: None,
            actions: EventActions::default(),
            partial: false,
            timestamp: Utc::now(),
        }
    }

    /// Event carrying a user message.
    pub fn user_message(invocation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(invocation_id, USER_AUTHOR).with_content(ModelMessage::user(text))
    }

    /// Event that only updates state.
    pub fn state_update(delta: State) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), SYSTEM_AUTHOR).with_state_delta(delta)
    }

    pub fn with_content(mut self, content: ModelMessage) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_state_delta(mut self, delta: State) -> Self {
        self.actions.state_delta = delta;
        self
    }

    /// Text of the event content, if any.
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().map(ModelMessage::text)
    }

    /// Whether this event is a complete agent reply meant for the user.
    pub fn is_final_response(&self) -> bool {
        !self.partial
            && self.author != USER_AUTHOR
            && self.author != SYSTEM_AUTHOR
            && self.content.as_ref().is_some_and(|c| !c.is_empty())
    }
}
