//! Convenience re-exports for common use.

pub use crate::agent::{customer_service_agent, Agent, AgentReply, InvocationContext, LlmAgent};
pub use crate::chat::{ChatLoop, ChatOutcome, ExitReason};
pub use crate::config::AppConfig;
pub use crate::error::{Result, SupportError};
pub use crate::provider::ModelProvider;
pub use crate::runner::{call_agent_async, Runner};
pub use crate::session::{
    CreateSessionRequest, InMemorySessionService, Session, SessionKey, SessionService, State,
};
pub use crate::types::{Event, GenerationSettings, ModelMessage, Role};
