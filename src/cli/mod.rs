//! Command-line arguments for the `support-desk` binary.

pub mod errors;

use clap::{Parser, ValueEnum};

use crate::config::AppConfig;

/// Interactive customer-support chat.
#[derive(Parser, Debug)]
#[command(name = "support-desk", version, about = "Chat with the customer service agent")]
pub struct Cli {
    /// Skip the name prompt and chat as this user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Gemini model id (overrides SUPPORT_DESK_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Application name sessions are stored under (overrides SUPPORT_DESK_APP_NAME)
    #[arg(long)]
    pub app_name: Option<String>,

    /// Print session state before and after every agent turn
    #[arg(long)]
    pub show_state: bool,

    /// Log output format (logs go to stderr; filter with RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Layer explicit flags over an env-derived config.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(app_name) = &self.app_name {
            config = config.with_app_name(app_name.clone());
        }
        if self.show_state {
            config = config.with_show_state(true);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_without_arguments() {
        let cli = Cli::try_parse_from(["support-desk"]).unwrap();
        assert!(cli.user.is_none());
        assert!(cli.model.is_none());
        assert!(!cli.show_state);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn parse_all_options() {
        let cli = Cli::try_parse_from([
            "support-desk",
            "-u",
            "Ada",
            "-m",
            "gemini-2.5-flash",
            "--app-name",
            "Course Shop",
            "--show-state",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("Ada"));
        assert_eq!(cli.log_format, LogFormat::Json);

        let config = cli.apply(AppConfig::default());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.app_name, "Course Shop");
        assert!(config.show_state);
    }

    #[test]
    fn flags_left_unset_keep_env_values() {
        let cli = Cli::try_parse_from(["support-desk"]).unwrap();
        let config = cli.apply(AppConfig::default().with_model("env-model"));
        assert_eq!(config.model, "env-model");
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["support-desk", "--log-format", "xml"]).is_err());
    }
}
