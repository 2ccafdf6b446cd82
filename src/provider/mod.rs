//! Model provider trait and implementations.

pub mod http;

#[cfg(feature = "google")]
pub mod google;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::{Result, SupportError};
#[cfg(feature = "google")]
use crate::models::google as models_google;
use crate::types::{FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate text (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}

/// Create a provider for the configured model.
pub fn create_provider(config: &AppConfig) -> Result<Box<dyn ModelProvider>> {
    #[cfg(feature = "google")]
    {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SupportError::Authentication("Missing GOOGLE_API_KEY (or GEMINI_API_KEY)".into())
        })?;
        let model: models_google::GoogleModel = config
            .model
            .parse()
            .map_err(|_| SupportError::Configuration(format!("Invalid model: {}", config.model)))?;
        let mut provider = google::GoogleProvider::new(model, api_key);
        if let Some(url) = &config.base_url {
            provider = provider.with_base_url(url.clone());
        }
        Ok(Box::new(provider))
    }

    #[cfg(not(feature = "google"))]
    {
        let _ = config;
        Err(SupportError::Configuration(
            "No model provider compiled in; enable the `google` feature".into(),
        ))
    }
}
