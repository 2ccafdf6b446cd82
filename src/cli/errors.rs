//! User-facing formatting of startup errors.

use crate::error::SupportError;

/// Map a [`SupportError`] to a help string with actionable guidance.
pub fn format_error_help(err: &SupportError) -> String {
    match err {
        SupportError::Authentication(msg) => {
            format!("Authentication failed: {msg}. Set GOOGLE_API_KEY in your environment or .env file")
        }
        SupportError::Configuration(msg) => {
            format!("Configuration error: {msg}. Check your .env file and command-line flags")
        }
        other => format!("{other}"),
    }
}
