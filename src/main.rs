//! support-desk binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use support_desk::agent::customer_service_agent;
use support_desk::chat::ChatLoop;
use support_desk::cli::errors::format_error_help;
use support_desk::cli::{Cli, LogFormat};
use support_desk::config::AppConfig;
use support_desk::error::{Result, SupportError};
use support_desk::provider;
use support_desk::session::InMemorySessionService;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_format)?;

    let config = cli.apply(AppConfig::from_env());
    tracing::debug!(?config, "configuration loaded");

    let provider = provider::create_provider(&config)?;
    let agent = Arc::new(customer_service_agent(Arc::from(provider)));
    let sessions = Arc::new(InMemorySessionService::new());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut chat = ChatLoop::new(config, sessions, agent, stdin, tokio::io::stdout());
    if let Some(user) = cli.user {
        chat = chat.with_user(user);
    }

    let outcome = chat.run().await?;
    tracing::info!(
        user = %outcome.user_id,
        session = %outcome.session_id,
        turns = outcome.turns,
        exit = ?outcome.exit_reason,
        "chat finished"
    );
    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| SupportError::Configuration(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| SupportError::Configuration(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
