//! Interaction history kept in session state, plus a readable state summary.

use std::fmt::Write as _;

use chrono::Utc;
use serde_json::{json, Value};

use crate::error::Result;
use crate::types::event::Event;

use super::{
    Session, SessionKey, SessionService, State, INTERACTION_HISTORY_KEY, PURCHASED_COURSES_KEY,
    USER_NAME_KEY,
};

/// Record a user query in the session's `interaction_history`.
pub async fn add_user_query_to_history(
    service: &dyn SessionService,
    key: &SessionKey,
    query: &str,
) -> Result<()> {
    let entry = json!({
        "action": "user_query",
        "query": query,
        "timestamp": Utc::now().to_rfc3339(),
    });
    push_history_entry(service, key, entry).await
}

/// Record an agent response in the session's `interaction_history`.
pub async fn add_agent_response_to_history(
    service: &dyn SessionService,
    key: &SessionKey,
    agent_name: &str,
    response: &str,
) -> Result<()> {
    let entry = json!({
        "action": "agent_response",
        "agent": agent_name,
        "response": response,
        "timestamp": Utc::now().to_rfc3339(),
    });
    push_history_entry(service, key, entry).await
}

async fn push_history_entry(
    service: &dyn SessionService,
    key: &SessionKey,
    entry: Value,
) -> Result<()> {
    let session = service.get_session(key).await?;

    let mut history = match session.state.get(INTERACTION_HISTORY_KEY) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    history.push(entry);

    let mut delta = State::new();
    delta.insert(INTERACTION_HISTORY_KEY.into(), Value::Array(history));
    service.append_event(key, Event::state_update(delta)).await?;
    Ok(())
}

/// Human-readable dump of the well-known state keys.
pub fn render_state(session: &Session, label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{:-^50}", format!(" {label} "));

    let user_name = session
        .state
        .get(USER_NAME_KEY)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown");
    let _ = writeln!(out, "User: {user_name}");

    let courses = list_of(&session.state, PURCHASED_COURSES_KEY);
    if courses.is_empty() {
        let _ = writeln!(out, "Courses: None");
    } else {
        let _ = writeln!(out, "Courses:");
        for course in courses {
            let _ = writeln!(out, "  - {}", describe_course(course));
        }
    }

    let history = list_of(&session.state, INTERACTION_HISTORY_KEY);
    if history.is_empty() {
        let _ = writeln!(out, "Interaction History: None");
    } else {
        let _ = writeln!(out, "Interaction History:");
        for (idx, item) in history.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", idx + 1, describe_interaction(item));
        }
    }

    let others: Vec<&String> = session
        .state
        .keys()
        .filter(|k| {
            ![USER_NAME_KEY, PURCHASED_COURSES_KEY, INTERACTION_HISTORY_KEY].contains(&k.as_str())
        })
        .collect();
    if !others.is_empty() {
        let _ = writeln!(
            out,
            "Other keys: {}",
            others.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
        );
    }

    let _ = write!(out, "{}", "-".repeat(50));
    out
}

fn list_of<'a>(state: &'a State, key: &str) -> &'a [Value] {
    state
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn describe_course(course: &Value) -> String {
    match course {
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            let id = obj.get("id").and_then(Value::as_str).unwrap_or("unknown");
            match obj.get("purchase_date").and_then(Value::as_str) {
                Some(date) => format!("{id} (purchased {date})"),
                None => id.to_string(),
            }
        }
        other => other.to_string(),
    }
}

fn describe_interaction(item: &Value) -> String {
    let action = item.get("action").and_then(Value::as_str);
    let timestamp = item
        .get("timestamp")
        .and_then(Value::as_str)
        .unwrap_or("unknown time");
    match action {
        Some("user_query") => {
            let query = item.get("query").and_then(Value::as_str).unwrap_or("");
            format!("User query at {timestamp}: \"{query}\"")
        }
        Some("agent_response") => {
            let agent = item.get("agent").and_then(Value::as_str).unwrap_or("agent");
            let response = item.get("response").and_then(Value::as_str).unwrap_or("");
            format!("{agent} response at {timestamp}: \"{}\"", truncate(response, 100))
        }
        _ => item.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{initial_state, CreateSessionRequest, InMemorySessionService};

    async fn seeded() -> (InMemorySessionService, SessionKey) {
        let service = InMemorySessionService::new();
        let key = SessionKey::main_session("app", "Ada");
        service
            .create_session(
                CreateSessionRequest::new("app", "Ada")
                    .with_session_id(&key.session_id)
                    .with_state(initial_state("Ada")),
            )
            .await
            .unwrap();
        (service, key)
    }

    #[tokio::test]
    async fn user_query_and_agent_response_are_appended_in_order() {
        let (service, key) = seeded().await;
        add_user_query_to_history(&service, &key, "What courses do I own?")
            .await
            .unwrap();
        add_agent_response_to_history(&service, &key, "support", "None yet.")
            .await
            .unwrap();

        let session = service.get_session(&key).await.unwrap();
        let history = session.state[INTERACTION_HISTORY_KEY].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["action"], "user_query");
        assert_eq!(history[0]["query"], "What courses do I own?");
        assert_eq!(history[1]["action"], "agent_response");
        assert_eq!(history[1]["agent"], "support");
        assert_eq!(session.events.len(), 2);
    }

    #[tokio::test]
    async fn history_on_missing_session_fails_with_not_found() {
        let service = InMemorySessionService::new();
        let err = add_user_query_to_history(&service, &SessionKey::new("a", "b", "c"), "hi")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn render_state_lists_known_keys() {
        let (service, key) = seeded().await;
        add_user_query_to_history(&service, &key, "hello").await.unwrap();
        let session = service.get_session(&key).await.unwrap();

        let rendered = render_state(&session, "State AFTER processing");
        assert!(rendered.contains("State AFTER processing"));
        assert!(rendered.contains("User: Ada"));
        assert!(rendered.contains("Courses: None"));
        assert!(rendered.contains("User query at"));
        assert!(rendered.contains("\"hello\""));
    }

    #[test]
    fn long_responses_are_truncated() {
        let long = "x".repeat(150);
        let item = json!({"action": "agent_response", "agent": "a", "response": long});
        let described = describe_interaction(&item);
        assert!(described.ends_with("...\""));
    }
}
