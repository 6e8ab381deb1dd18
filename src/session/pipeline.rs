// src/session/pipeline.rs
// Retrieval -> prompt -> completion -> parse, one pass per accepted trigger

use std::sync::Arc;

use rand::Rng;
use tracing::{info, instrument, warn};

use super::state::RunOutcome;
use crate::config::{Config, Profile};
use crate::error::Result;
use crate::idea::{Companionship, IdeaParser, LabelParser, Selection};
use crate::llm::{ChatBackend, CompletionClient, OpenAiClient};
use crate::persona::Persona;
use crate::prompt::{PromptOptions, build_prompt};
use crate::retrieval::{
    ExampleSet, ExampleStore, FallbackCatalog, VectorStoreIndex, fetch_remote_examples,
};

/// The collaborators of one generation run. Immutable and shareable across
/// sessions; all per-run data lives in the session's state machine.
pub struct IdeaPipeline {
    store: Option<Arc<dyn ExampleStore>>,
    catalog: FallbackCatalog,
    completions: CompletionClient,
    parser: Arc<dyn IdeaParser>,
    profile: Profile,
    persona: Persona,
}

impl IdeaPipeline {
    pub fn new(
        store: Option<Arc<dyn ExampleStore>>,
        catalog: FallbackCatalog,
        completions: CompletionClient,
        profile: Profile,
    ) -> Self {
        Self {
            store: store.filter(|_| profile.remote_retrieval),
            catalog,
            completions,
            parser: Arc::new(LabelParser::new(profile.execution_plan)),
            profile,
            persona: Persona::default(),
        }
    }

    /// Wire the production clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(OpenAiClient::from_config(config)?);

        let store: Option<Arc<dyn ExampleStore>> = match (&config.vector_store_id, config.profile.remote_retrieval) {
            (Some(id), true) => Some(Arc::new(VectorStoreIndex::new(client.clone(), id.clone()))),
            _ => None,
        };
        let backend: Arc<dyn ChatBackend> = client;
        let completions = CompletionClient::from_config(backend, config);

        Ok(Self::new(
            store,
            FallbackCatalog::new(config.fallback_dir.clone()),
            completions,
            config.profile,
        ))
    }

    /// Swap the completion parser (e.g. for a structured-output contract)
    pub fn with_parser(mut self, parser: Arc<dyn IdeaParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Drop or default the companionship according to the profile
    pub fn normalize(&self, selection: &Selection) -> Selection {
        Selection {
            category: selection.category,
            companionship: if self.profile.companionship {
                Some(selection.companionship.unwrap_or(Companionship::Alone))
            } else {
                None
            },
        }
    }

    fn prompt_options(&self) -> PromptOptions {
        PromptOptions {
            persona: self.persona,
            execution_plan: self.profile.execution_plan,
        }
    }

    /// Remote store first; local catalog when it is absent or fails.
    pub async fn gather_examples<R>(&self, selection: &Selection, rng: &mut R) -> Result<ExampleSet>
    where
        R: Rng + ?Sized,
    {
        if let Some(store) = &self.store {
            match fetch_remote_examples(store.as_ref(), selection).await {
                Ok(set) => return Ok(set),
                Err(e) => warn!(error = %e, "Falling back to local catalog"),
            }
        }
        self.catalog.fetch_local_examples(rng)
    }

    /// Run the whole pipeline. Every failure becomes a [`RunOutcome`] variant;
    /// nothing is returned as an error.
    #[instrument(skip(self, rng), fields(profile = %self.profile.kind))]
    pub async fn run<R>(&self, selection: &Selection, rng: &mut R) -> RunOutcome
    where
        R: Rng + ?Sized,
    {
        let selection = self.normalize(selection);

        let examples = match self.gather_examples(&selection, rng).await {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "No examples from any source");
                return RunOutcome::NoExamples;
            }
        };
        info!(
            count = examples.len(),
            used_fallback = examples.used_fallback(),
            "Examples ready"
        );

        let prompt = build_prompt(&examples.records, &selection, &self.prompt_options());

        match self.completions.generate(&prompt).await {
            Ok(completion) => {
                let idea = self.parser.parse(Some(&completion.text));
                if idea.is_blank() {
                    warn!(model = %completion.model, "Completion had no recognisable title");
                }
                RunOutcome::Success {
                    examples,
                    prompt,
                    completion,
                    idea,
                }
            }
            Err(e) => {
                warn!(error = %e, "Generation failed");
                RunOutcome::GenerationFailed { examples, prompt }
            }
        }
    }
}
