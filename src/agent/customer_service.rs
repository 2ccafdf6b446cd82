//! The agent shipped with the `support-desk` binary.

use std::sync::Arc;

use crate::provider::ModelProvider;
use crate::types::GenerationSettings;

use super::LlmAgent;

pub const CUSTOMER_SERVICE_AGENT_NAME: &str = "customer_service_agent";

const INSTRUCTION: &str = "\
You are the customer service agent for an online course catalog.
Answer questions about courses, purchases, refunds and account details.
Be friendly, concise and accurate. If you do not know something, say so
instead of guessing.

<user_info>
Name: {user_name}
</user_info>

<purchase_info>
Purchased courses: {purchased_courses}
</purchase_info>

<interaction_history>
{interaction_history}
</interaction_history>

Use the purchase information to tailor your answer: never offer to sell a
course the user already owns, and point owners at course content instead.";

/// Build the customer service agent on top of `provider`.
pub fn customer_service_agent(provider: Arc<dyn ModelProvider>) -> LlmAgent {
    LlmAgent::new(CUSTOMER_SERVICE_AGENT_NAME, provider)
        .with_description("Customer service agent for the online course catalog")
        .with_instruction(INSTRUCTION)
        .with_settings(GenerationSettings::builder().temperature(0.4).build())
}
