//! support-desk: interactive customer-support chat.
//!
//! Wires a conversational agent to a session store and runs a
//! read-input / run-agent / print-state loop for one local user.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use support_desk::prelude::*;
//!
//! # async fn example() -> support_desk::error::Result<()> {
//! let config = AppConfig::from_env();
//! let provider = support_desk::provider::create_provider(&config)?;
//! let agent = Arc::new(customer_service_agent(Arc::from(provider)));
//! let sessions = Arc::new(InMemorySessionService::new());
//!
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! let mut chat = ChatLoop::new(config, sessions, agent, stdin, tokio::io::stdout());
//! chat.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod runner;
pub mod session;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
