//! Runs an agent against a stored session.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use crate::agent::{Agent, InvocationContext};
use crate::error::Result;
use crate::session::{SessionKey, SessionService};
use crate::types::event::{Event, USER_AUTHOR};
use crate::types::ModelMessage;

/// Stream of events produced by one invocation.
pub type EventStream = BoxStream<'static, Result<Event>>;

/// Binds one agent to an app and a session service.
#[derive(Clone)]
pub struct Runner {
    agent: Arc<dyn Agent>,
    app_name: String,
    session_service: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(
        agent: Arc<dyn Agent>,
        app_name: impl Into<String>,
        session_service: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            agent,
            app_name: app_name.into(),
            session_service,
        }
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Run the agent for one user message.
    ///
    /// The user message and the agent's reply are both appended to the
    /// session; the agent's reply event is yielded once stored.
    pub fn run_async(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: ModelMessage,
    ) -> EventStream {
        let key = SessionKey::new(&self.app_name, user_id, session_id);
        Box::pin(invocation(
            Arc::clone(&self.agent),
            Arc::clone(&self.session_service),
            key,
            new_message,
        ))
    }
}

fn invocation(
    agent: Arc<dyn Agent>,
    service: Arc<dyn SessionService>,
    key: SessionKey,
    new_message: ModelMessage,
) -> impl Stream<Item = Result<Event>> + Send + 'static {
    async_stream::try_stream! {
        let invocation_id = format!("e-{}", Uuid::new_v4());

        // Fails with SessionNotFound before anything is written.
        service.get_session(&key).await?;

        let user_event = Event::new(&invocation_id, USER_AUTHOR).with_content(new_message.clone());
        service.append_event(&key, user_event).await?;

        let session = service.get_session(&key).await?;
        let ctx = InvocationContext {
            invocation_id: invocation_id.clone(),
            app_name: key.app_name.clone(),
            user_id: key.user_id.clone(),
            session,
            user_content: new_message,
        };

        debug!(agent = agent.name(), invocation = %invocation_id, "running agent");
        let reply = agent.run(&ctx).await?;

        let agent_event = Event::new(&invocation_id, agent.name())
            .with_content(ModelMessage::assistant(reply.text))
            .with_state_delta(reply.state_delta);
        let stored = service.append_event(&key, agent_event).await?;

        info!(
            agent = agent.name(),
            invocation = %invocation_id,
            session = %key.session_id,
            "agent turn complete"
        );
        yield stored;
    }
}

/// Run one query and return the agent's final response text, if any.
pub async fn call_agent_async(
    runner: &Runner,
    user_id: &str,
    session_id: &str,
    query: &str,
) -> Result<Option<String>> {
    let mut events = runner.run_async(user_id, session_id, ModelMessage::user(query));
    let mut final_text = None;

    while let Some(event) = events.next().await {
        let event = event?;
        if event.is_final_response() {
            final_text = event.text();
        }
    }

    Ok(final_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentReply;
    use crate::error::SupportError;
    use crate::session::{initial_state, CreateSessionRequest, InMemorySessionService};
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn run(&self, ctx: &InvocationContext) -> Result<AgentReply> {
            Ok(AgentReply::text(format!("echo: {}", ctx.user_content.text()))
                .with_state("last_echo", json!(ctx.user_content.text())))
        }
    }

    async fn runner_with_session() -> (Runner, Arc<InMemorySessionService>) {
        let service = Arc::new(InMemorySessionService::new());
        service
            .create_session(
                CreateSessionRequest::new("app", "ada")
                    .with_session_id("ada_main_session")
                    .with_state(initial_state("ada")),
            )
            .await
            .unwrap();
        let runner = Runner::new(Arc::new(Echo), "app", service.clone());
        (runner, service)
    }

    #[tokio::test]
    async fn run_appends_user_and_agent_events() {
        let (runner, service) = runner_with_session().await;
        let reply = call_agent_async(&runner, "ada", "ada_main_session", "hello")
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("echo: hello"));

        let session = service
            .get_session(&SessionKey::new("app", "ada", "ada_main_session"))
            .await
            .unwrap();
        assert_eq!(session.events.len(), 2);
        assert_eq!(session.events[0].author, "user");
        assert_eq!(session.events[1].author, "echo");
        assert_eq!(session.state["last_echo"], json!("hello"));
        assert_eq!(session.events[0].invocation_id, session.events[1].invocation_id);
    }

    #[tokio::test]
    async fn run_against_missing_session_is_not_found() {
        let (runner, service) = runner_with_session().await;
        let err = call_agent_async(&runner, "ada", "other_session", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, SupportError::SessionNotFound { .. }));
        assert_eq!(service.len().await, 1);
    }
}
