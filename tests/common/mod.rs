//! Shared test doubles: a scripted agent and a session service that can be broken on demand.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use support_desk::agent::{Agent, AgentReply, InvocationContext};
use support_desk::config::AppConfig;
use support_desk::error::{Result, SupportError};
use support_desk::session::{
    CreateSessionRequest, InMemorySessionService, Session, SessionKey, SessionService,
};
use support_desk::types::Event;

/// Agent that answers from a queue of canned replies and records every query.
pub struct ScriptedAgent {
    name: String,
    replies: Mutex<VecDeque<std::result::Result<AgentReply, String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text reply.
    pub fn queue_reply(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(AgentReply::text(text)));
    }

    /// Queue a reply that also changes session state.
    pub fn queue_reply_with_state(&self, text: &str, key: &str, value: serde_json::Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(AgentReply::text(text).with_state(key, value)));
    }

    /// Queue a failure.
    pub fn queue_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Queries the agent has been asked so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &InvocationContext) -> Result<AgentReply> {
        self.calls.lock().unwrap().push(ctx.user_content.text());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(SupportError::Agent {
                agent: self.name.clone(),
                message,
            }),
            None => Ok(AgentReply::text("Happy to help!")),
        }
    }
}

/// Agent that deletes its own session mid-turn.
pub struct SessionDroppingAgent {
    pub service: Arc<InMemorySessionService>,
}

#[async_trait]
impl Agent for SessionDroppingAgent {
    fn name(&self) -> &str {
        "dropper"
    }

    async fn run(&self, ctx: &InvocationContext) -> Result<AgentReply> {
        self.service.delete_session(&ctx.session.key()).await?;
        Ok(AgentReply::text("gone"))
    }
}

/// Wraps an in-memory service; lookups for "broken" users fail with a backend error.
pub struct FlakySessionService {
    pub inner: InMemorySessionService,
    broken_users: Mutex<HashSet<String>>,
}

impl FlakySessionService {
    pub fn new() -> Self {
        Self {
            inner: InMemorySessionService::new(),
            broken_users: Mutex::new(HashSet::new()),
        }
    }

    pub fn break_user(&self, user_id: &str) {
        self.broken_users
            .lock()
            .unwrap()
            .insert(user_id.to_string());
    }

    fn is_broken(&self, user_id: &str) -> bool {
        self.broken_users.lock().unwrap().contains(user_id)
    }
}

#[async_trait]
impl SessionService for FlakySessionService {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<Session> {
        self.inner.create_session(request).await
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Session> {
        if self.is_broken(&key.user_id) {
            return Err(SupportError::SessionService(
                "backend unavailable".to_string(),
            ));
        }
        self.inner.get_session(key).await
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>> {
        self.inner.list_sessions(app_name, user_id).await
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<()> {
        self.inner.delete_session(key).await
    }

    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<Event> {
        self.inner.append_event(key, event).await
    }

    fn generate_id(&self) -> String {
        "abc123".to_string()
    }
}

/// Agent that breaks the flaky service for its user while answering.
pub struct BackendBreakingAgent {
    pub service: Arc<FlakySessionService>,
}

#[async_trait]
impl Agent for BackendBreakingAgent {
    fn name(&self) -> &str {
        "breaker"
    }

    async fn run(&self, ctx: &InvocationContext) -> Result<AgentReply> {
        self.service.break_user(&ctx.user_id);
        Ok(AgentReply::text("ok"))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::default().with_app_name("Customer Support")
}
