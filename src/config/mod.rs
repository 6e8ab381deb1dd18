// src/config/mod.rs
// Environment-based configuration - single source of truth for all env vars

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{IdeaError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4";
pub const DEFAULT_SECONDARY_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_FALLBACK_DIR: &str = "maxfosh_summaries";
pub const DEFAULT_TEMPERATURE: f32 = 0.9;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Minimum time between accepted triggers while a run is still busy
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// The observed variants of the generator, expressed as profiles of one core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Category + companionship, execution plan, 30s cool-down, vector index
    Mates,
    /// Category only, title + description, 30s cool-down, vector index
    Classic,
    /// Category only, execution plan, no cool-down, local catalog only
    Instant,
}

impl ProfileKind {
    pub fn profile(&self) -> Profile {
        match self {
            Self::Mates => Profile {
                kind: *self,
                companionship: true,
                execution_plan: true,
                cooldown: Some(DEFAULT_COOLDOWN),
                remote_retrieval: true,
            },
            Self::Classic => Profile {
                kind: *self,
                companionship: false,
                execution_plan: false,
                cooldown: Some(DEFAULT_COOLDOWN),
                remote_retrieval: true,
            },
            Self::Instant => Profile {
                kind: *self,
                companionship: false,
                execution_plan: true,
                cooldown: None,
                remote_retrieval: false,
            },
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mates => write!(f, "mates"),
            Self::Classic => write!(f, "classic"),
            Self::Instant => write!(f, "instant"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = IdeaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mates" => Ok(Self::Mates),
            "classic" => Ok(Self::Classic),
            "instant" => Ok(Self::Instant),
            other => Err(IdeaError::Config(format!(
                "unknown profile '{other}' (expected mates, classic or instant)"
            ))),
        }
    }
}

/// Feature switches for one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub kind: ProfileKind,
    /// Ask for (and send) the companionship choice
    pub companionship: bool,
    /// Request and parse an `Execution Plan:` section
    pub execution_plan: bool,
    /// `None` means a new trigger is always accepted, even while busy
    pub cooldown: Option<Duration>,
    /// Query the vector index before falling back to the local catalog
    pub remote_retrieval: bool,
}

impl Default for Profile {
    fn default() -> Self {
        ProfileKind::Mates.profile()
    }
}

/// Runtime configuration
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub vector_store_id: Option<String>,
    pub api_base: String,
    pub primary_model: String,
    pub secondary_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub fallback_dir: PathBuf,
    pub profile: Profile,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("vector_store_id", &self.vector_store_id)
            .field("api_base", &self.api_base)
            .field("primary_model", &self.primary_model)
            .field("secondary_model", &self.secondary_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("fallback_dir", &self.fallback_dir)
            .field("profile", &self.profile)
            .finish()
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing credentials are a hard error: the generator refuses to start
    /// rather than running with a half-configured pipeline.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let profile = match read("SILLYGEN_PROFILE") {
            Some(name) => name.parse::<ProfileKind>()?.profile(),
            None => Profile::default(),
        };

        let openai_api_key = read("OPENAI_API_KEY")
            .ok_or_else(|| IdeaError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let config = Self {
            openai_api_key,
            vector_store_id: read("OPENAI_VECTOR_STORE_ID"),
            api_base: read("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            primary_model: read("SILLYGEN_PRIMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string()),
            secondary_model: read("SILLYGEN_SECONDARY_MODEL")
                .unwrap_or_else(|| DEFAULT_SECONDARY_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            fallback_dir: read("SILLYGEN_FALLBACK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_DIR)),
            profile,
        };
        config.validate()?;
        config.log_status();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.profile.remote_retrieval && self.vector_store_id.is_none() {
            return Err(IdeaError::Config(format!(
                "OPENAI_VECTOR_STORE_ID is required by the '{}' profile",
                self.profile.kind
            )));
        }
        Ok(())
    }

    fn log_status(&self) {
        info!(
            profile = %self.profile.kind,
            primary = %self.primary_model,
            secondary = %self.secondary_model,
            "Configuration loaded"
        );
        debug!(
            vector_store = self.vector_store_id.is_some(),
            fallback_dir = %self.fallback_dir.display(),
            api_base = %self.api_base,
            "Retrieval settings"
        );
    }
}
