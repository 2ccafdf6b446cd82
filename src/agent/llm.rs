//! Model-backed agent with session-state instruction templating.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SupportError};
use crate::provider::{ModelProvider, ProviderRequest};
use crate::session::State;
use crate::types::event::USER_AUTHOR;
use crate::types::{GenerationSettings, ModelMessage};

use super::{Agent, AgentReply, InvocationContext};

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_:]*)(\?)?\}").expect("placeholder pattern is valid")
    })
}

/// An agent that answers by calling a language model.
///
/// The instruction may reference session state: `{key}` is replaced with the
/// value stored under `key` (an error if missing), `{key?}` with the value or
/// nothing.
pub struct LlmAgent {
    name: String,
    description: String,
    instruction: String,
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
    output_key: Option<String>,
    include_history: bool,
}

impl LlmAgent {
    pub fn new(name: impl Into<String>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: String::new(),
            provider,
            settings: GenerationSettings::default(),
            output_key: None,
            include_history: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Also store the reply text in session state under `key`.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Send only the current user message instead of the whole conversation.
    pub fn without_history(mut self) -> Self {
        self.include_history = false;
        self
    }

    fn build_messages(&self, ctx: &InvocationContext) -> Result<Vec<ModelMessage>> {
        let mut messages = Vec::new();

        if !self.instruction.is_empty() {
            let instruction = inject_state(&self.instruction, &ctx.session.state)?;
            messages.push(ModelMessage::system(instruction));
        }

        if self.include_history {
            for event in &ctx.session.events {
                let Some(content) = &event.content else {
                    continue;
                };
                if event.partial || content.is_empty() {
                    continue;
                }
                if event.author == USER_AUTHOR {
                    messages.push(ModelMessage::user(content.text()));
                } else if event.author == self.name {
                    messages.push(ModelMessage::assistant(content.text()));
                }
            }
        }

        let current = &ctx.user_content;
        let has_current = messages
            .last()
            .is_some_and(|m| m.role == current.role && m.text() == current.text());
        if !has_current {
            messages.push(ctx.user_content.clone());
        }

        Ok(messages)
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, ctx: &InvocationContext) -> Result<AgentReply> {
        let request = ProviderRequest {
            messages: self.build_messages(ctx)?,
            settings: self.settings.clone(),
        };

        debug!(
            agent = %self.name,
            invocation = %ctx.invocation_id,
            model = self.provider.model_id(),
            messages = request.messages.len(),
            "invoking model"
        );

        let response = self
            .provider
            .generate_text(&request)
            .await
            .map_err(|err| match err {
                passthrough @ (SupportError::Network(_)
                | SupportError::Api { .. }
                | SupportError::Authentication(_)
                | SupportError::RateLimited { .. }) => passthrough,
                other => SupportError::Agent {
                    agent: self.name.clone(),
                    message: other.to_string(),
                },
            })?;

        let mut reply = AgentReply::text(response.text.clone());
        if let Some(key) = &self.output_key {
            reply = reply.with_state(key.clone(), Value::String(response.text));
        }
        Ok(reply)
    }
}

/// Replace `{key}` / `{key?}` placeholders with session state values.
pub fn inject_state(template: &str, state: &State) -> Result<String> {
    let mut missing = None;
    let rendered = placeholder().replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        let optional = caps.get(2).is_some();
        match state.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None if optional => String::new(),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(key) => Err(SupportError::InvalidState(format!(
            "instruction references missing state key `{key}`"
        ))),
        None => Ok(rendered.into_owned()),
    }
}
