// src/llm/completion.rs
// Two-tier completion: primary model, then exactly one secondary attempt

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{Config, DEFAULT_MAX_TOKENS, DEFAULT_SECONDARY_MODEL, DEFAULT_TEMPERATURE};
use crate::error::{IdeaError, Result};

/// One call to a generation model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Anything that can turn a prompt into text for a given model
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String>;
}

/// Raw completion text plus which model produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub used_secondary: bool,
}

/// Calls the primary model and degrades to the secondary one on any failure.
///
/// This is a fixed two-step policy, not a retry loop: at most two backend
/// calls per `generate`, no backoff.
pub struct CompletionClient {
    backend: Arc<dyn ChatBackend>,
    primary_model: String,
    secondary_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn ChatBackend>, primary_model: impl Into<String>) -> Self {
        Self {
            backend,
            primary_model: primary_model.into(),
            secondary_model: DEFAULT_SECONDARY_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &Config) -> Self {
        Self::new(backend, config.primary_model.clone())
            .with_secondary(config.secondary_model.clone())
            .with_sampling(config.temperature, config.max_tokens)
    }

    pub fn with_secondary(mut self, model: impl Into<String>) -> Self {
        self.secondary_model = model.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn request_for(&self, model: &str, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    #[instrument(skip_all, fields(primary = %self.primary_model, secondary = %self.secondary_model))]
    pub async fn generate(&self, prompt: &str) -> Result<Completion> {
        let primary = self.request_for(&self.primary_model, prompt);
        let primary_err = match self.backend.complete(&primary).await {
            Ok(text) => {
                return Ok(Completion {
                    text,
                    model: primary.model,
                    used_secondary: false,
                });
            }
            Err(e) => e,
        };
        warn!(error = %primary_err, "Primary model failed, trying secondary");

        let secondary = self.request_for(&self.secondary_model, prompt);
        match self.backend.complete(&secondary).await {
            Ok(text) => {
                info!(model = %secondary.model, "Secondary model answered");
                Ok(Completion {
                    text,
                    model: secondary.model,
                    used_secondary: true,
                })
            }
            Err(secondary_err) => {
                warn!(error = %secondary_err, "Secondary model failed");
                Err(IdeaError::Generation(format!(
                    "{}: {primary_err}; {}: {secondary_err}",
                    self.primary_model, self.secondary_model
                )))
            }
        }
    }
}
