//! Agents: the component that turns one user message into a reply.

pub mod customer_service;
pub mod llm;

pub use customer_service::{customer_service_agent, CUSTOMER_SERVICE_AGENT_NAME};
pub use llm::LlmAgent;

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{Session, State};
use crate::types::ModelMessage;

/// Everything an agent sees for one invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub invocation_id: String,
    pub app_name: String,
    pub user_id: String,
    /// Session snapshot taken after the user's message was appended.
    pub session: Session,
    pub user_content: ModelMessage,
}

/// An agent's answer to one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReply {
    pub text: String,
    /// State changes to persist with the reply.
    pub state_delta: State,
}

impl AgentReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state_delta: State::new(),
        }
    }

    pub fn with_state(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.state_delta.insert(key.into(), value);
        self
    }
}

/// A conversational agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name; used as the author of the agent's events.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Produce a reply for the invocation.
    async fn run(&self, ctx: &InvocationContext) -> Result<AgentReply>;
}
