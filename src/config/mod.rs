//! Configuration system (layered: code > env > defaults).

use std::fmt;

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "Customer Support";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Layered configuration for the support desk.
///
/// Resolution order:
/// 1. Explicit setters (CLI flags)
/// 2. Environment variables (a `.env` file is loaded first if present)
/// 3. Built-in defaults
#[derive(Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub show_state: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_name", &self.app_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("show_state", &self.show_state)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            show_state: false,
        }
    }
}

impl AppConfig {
    /// Load from environment variables (GOOGLE_API_KEY, SUPPORT_DESK_MODEL, etc.).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // GOOGLE_API_KEY wins over GEMINI_API_KEY when both are set.
        config.api_key = ["GOOGLE_API_KEY", "GEMINI_API_KEY"]
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()));

        if let Some(url) = lookup("GOOGLE_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = Some(url);
        }
        if let Some(model) = lookup("SUPPORT_DESK_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        if let Some(name) = lookup("SUPPORT_DESK_APP_NAME").filter(|v| !v.trim().is_empty()) {
            config.app_name = name;
        }
        if let Some(flag) = lookup("SUPPORT_DESK_SHOW_STATE") {
            config.show_state = parse_flag(&flag);
        }

        config
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_show_state(mut self, show_state: bool) -> Self {
        self.show_state = show_state;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_key.is_none());
        assert!(config.base_url.is_none());
        assert!(!config.show_state);
    }

    #[test]
    fn google_key_takes_precedence_over_gemini_key() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "google-key"),
            ("GEMINI_API_KEY", "gemini-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("google-key"));
    }

    #[test]
    fn gemini_key_is_used_as_fallback() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "  "),
            ("GEMINI_API_KEY", "gemini-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("gemini-key"));
    }

    #[test]
    fn env_overrides_model_app_name_and_show_state() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SUPPORT_DESK_MODEL", "gemini-2.5-flash"),
            ("SUPPORT_DESK_APP_NAME", "Course Shop"),
            ("SUPPORT_DESK_SHOW_STATE", "Yes"),
            ("GOOGLE_BASE_URL", "http://localhost:9999"),
        ]));
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.app_name, "Course Shop");
        assert!(config.show_state);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn explicit_setters_override_env() {
        let config = AppConfig::from_lookup(lookup_from(&[("SUPPORT_DESK_MODEL", "env-model")]))
            .with_model("cli-model")
            .with_show_state(true);
        assert_eq!(config.model, "cli-model");
        assert!(config.show_state);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig::default().with_api_key("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
