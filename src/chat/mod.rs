//! The interactive read-input / run-agent / print-state loop.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::agent::Agent;
use crate::config::AppConfig;
use crate::error::{Result, SupportError};
use crate::runner::{call_agent_async, Runner};
use crate::session::{
    add_agent_response_to_history, add_user_query_to_history, initial_state, main_session_id,
    render_state, CreateSessionRequest, Session, SessionKey, SessionService, State,
};

/// User id used when no name is given.
pub const GUEST_USER: &str = "Guest";

/// Prefix of the user id given to fallback sessions after a session-store failure.
pub const ERROR_GUEST_PREFIX: &str = "Guest_Error_";

/// Why the conversation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user typed `exit` or `quit`.
    UserExit,
    /// Input was closed.
    EndOfInput,
    /// The session could not be refreshed after a turn.
    SessionLost,
}

/// Summary of a finished chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub user_id: String,
    pub session_id: String,
    /// Number of messages handed to the agent.
    pub turns: usize,
    pub exit_reason: ExitReason,
    /// State printed at the end, if it could be fetched.
    pub final_state: Option<State>,
}

/// How the session for this chat was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOrigin {
    Resumed,
    Created,
    ErrorFallback,
}

/// One interactive conversation over arbitrary line input and text output.
pub struct ChatLoop<R, W> {
    config: AppConfig,
    session_service: Arc<dyn SessionService>,
    agent: Arc<dyn Agent>,
    input: R,
    output: W,
    preset_user: Option<String>,
}

impl<R, W> ChatLoop<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(
        config: AppConfig,
        session_service: Arc<dyn SessionService>,
        agent: Arc<dyn Agent>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            config,
            session_service,
            agent,
            input,
            output,
            preset_user: None,
        }
    }

    /// Use `name` instead of prompting for it.
    pub fn with_user(mut self, name: impl Into<String>) -> Self {
        self.preset_user = Some(name.into());
        self
    }

    /// Give back the output sink (useful for inspecting a transcript).
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the whole conversation: name prompt, session setup, loop, final state.
    pub async fn run(&mut self) -> Result<ChatOutcome> {
        let user_name = self.ask_user_name().await?;
        let app_name = self.config.app_name.clone();

        let (user_id, mut session) = match self.establish_session(&app_name, &user_name).await {
            Ok((user_id, session, origin)) => {
                info!(user = %user_id, session = %session.id, ?origin, "session established");
                (user_id, session)
            }
            Err(err) => {
                self.say("Critical error: Session could not be established. Exiting.").await?;
                return Err(err);
            }
        };

        let runner = Runner::new(
            Arc::clone(&self.agent),
            app_name.clone(),
            Arc::clone(&self.session_service),
        );

        self.say("\nWelcome to Customer Service Chat!").await?;
        self.say("Type 'exit' or 'quit' to end the conversation.\n").await?;

        let mut turns = 0;
        let exit_reason = loop {
            let prompt = format!("{}: ", session.user_name_or(&user_id));
            let Some(user_input) = self.prompt(&prompt).await? else {
                self.say("\nEnding conversation. Goodbye!").await?;
                break ExitReason::EndOfInput;
            };

            if is_exit_command(&user_input) {
                self.say("Ending conversation. Goodbye!").await?;
                break ExitReason::UserExit;
            }

            let key = session.key();
            turns += 1;
            self.run_turn(&runner, &key, &session, &user_input).await?;

            match self.session_service.get_session(&key).await {
                Ok(refreshed) => session = refreshed,
                Err(err) if err.is_not_found() => {
                    self.say("Error: Session lost during interaction. Exiting.").await?;
                    break ExitReason::SessionLost;
                }
                Err(err) => {
                    self.say(&format!("Error refreshing session state: {err}. Exiting.")).await?;
                    break ExitReason::SessionLost;
                }
            }
        };

        let final_state = self.print_final_state(&session.key()).await?;

        Ok(ChatOutcome {
            user_id,
            session_id: session.id,
            turns,
            exit_reason,
            final_state,
        })
    }

    async fn ask_user_name(&mut self) -> Result<String> {
        if let Some(name) = self.preset_user.clone() {
            if !name.trim().is_empty() {
                return Ok(name.trim().to_string());
            }
        }

        let entered = self.prompt("Please enter your name: ").await?;
        match entered.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => {
                self.say(&format!("No valid name entered, proceeding as '{GUEST_USER}'.")).await?;
                Ok(GUEST_USER.to_string())
            }
        }
    }

    /// Load the user's main session, create it, or fall back to a guest session.
    async fn establish_session(
        &mut self,
        app_name: &str,
        user_name: &str,
    ) -> Result<(String, Session, SessionOrigin)> {
        let key = SessionKey::main_session(app_name, user_name);

        match self.session_service.get_session(&key).await {
            Ok(session) => {
                let shown = session.user_name_or(user_name).to_string();
                self.say(&format!(
                    "Welcome back, {shown}! Loaded existing session: {}",
                    session.id
                ))
                .await?;
                Ok((user_name.to_string(), session, SessionOrigin::Resumed))
            }
            Err(err) if err.is_not_found() => {
                self.say(&format!("Welcome, {user_name}! Creating new session...")).await?;
                let session = self.create_main_session(app_name, user_name).await?;
                self.say(&format!("New session created: {}", session.id)).await?;
                Ok((user_name.to_string(), session, SessionOrigin::Created))
            }
            Err(err) => {
                warn!(error = %err, "session lookup failed; using guest fallback");
                self.say(&format!(
                    "An unexpected error occurred during session handling: {err}"
                ))
                .await?;
                self.say("Proceeding with a temporary guest session due to error.").await?;

                let guest_id = format!(
                    "{ERROR_GUEST_PREFIX}{}",
                    self.session_service.generate_id()
                );
                let session = self.create_main_session(app_name, &guest_id).await?;
                self.say(&format!("Error fallback session created: {}", session.id)).await?;
                Ok((guest_id, session, SessionOrigin::ErrorFallback))
            }
        }
    }

    async fn create_main_session(&self, app_name: &str, user_id: &str) -> Result<Session> {
        self.session_service
            .create_session(
                CreateSessionRequest::new(app_name, user_id)
                    .with_session_id(main_session_id(user_id))
                    .with_state(initial_state(user_id)),
            )
            .await
    }

    async fn run_turn(
        &mut self,
        runner: &Runner,
        key: &SessionKey,
        before: &Session,
        user_input: &str,
    ) -> Result<()> {
        let service = Arc::clone(&self.session_service);

        if let Err(err) = add_user_query_to_history(service.as_ref(), key, user_input).await {
            warn!(error = %err, "could not record user query");
        }

        if self.config.show_state {
            let before = service.get_session(key).await.unwrap_or_else(|_| before.clone());
            self.say(&render_state(&before, "State BEFORE processing")).await?;
        }

        let agent_name = runner.agent().name().to_string();
        match call_agent_async(runner, &key.user_id, &key.session_id, user_input).await {
            Ok(Some(reply)) => {
                self.say(&format!("\n{agent_name}: {reply}\n")).await?;
                if let Err(err) =
                    add_agent_response_to_history(service.as_ref(), key, &agent_name, &reply).await
                {
                    warn!(error = %err, "could not record agent response");
                }
            }
            Ok(None) => {
                self.say(&format!("\n{agent_name}: (no response)\n")).await?;
            }
            Err(err) => {
                warn!(error = %err, "agent call failed");
                self.say(&format!("Error during agent call: {err}")).await?;
            }
        }

        if self.config.show_state {
            if let Ok(after) = service.get_session(key).await {
                self.say(&render_state(&after, "State AFTER processing")).await?;
            }
        }

        Ok(())
    }

    async fn print_final_state(&mut self, key: &SessionKey) -> Result<Option<State>> {
        match self.session_service.get_session(key).await {
            Ok(session) => {
                self.say("\nFinal Session State:").await?;
                for (name, value) in &session.state {
                    self.say(&format!("{name}: {}", display_value(value))).await?;
                }
                Ok(Some(session.state))
            }
            Err(SupportError::SessionNotFound { session_id, .. }) => {
                self.say(&format!(
                    "Could not retrieve final session state for {session_id}. \
                     It might have been deleted or an error occurred."
                ))
                .await?;
                Ok(None)
            }
            Err(err) => {
                self.say(&format!("Error retrieving final session state: {err}")).await?;
                Ok(None)
            }
        }
    }

    /// Print `prompt` and read one line. `None` means input is closed.
    async fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

/// Whether the line, as typed, ends the conversation (`exit` / `quit`, any case).
pub fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Strings print raw; everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
