// src/retrieval/vector_store.rs
// Example Store client backed by an OpenAI vector store

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::{EXAMPLE_COUNT, ExampleRecord, ExampleSet, ExampleStore};
use crate::error::{IdeaError, Result};
use crate::idea::Selection;
use crate::llm::{OpenAiClient, SearchHit};
use crate::persona::CREATOR_NAME;

/// Vector store searched through the OpenAI API
pub struct VectorStoreIndex {
    client: Arc<OpenAiClient>,
    store_id: String,
}

impl VectorStoreIndex {
    pub fn new(client: Arc<OpenAiClient>, store_id: impl Into<String>) -> Self {
        Self {
            client,
            store_id: store_id.into(),
        }
    }
}

#[async_trait]
impl ExampleStore for VectorStoreIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Map<String, Value>>> {
        let hits = self
            .client
            .search_vector_store(&self.store_id, query, limit)
            .await
            .map_err(|e| IdeaError::Retrieval(e.to_string()))?;
        Ok(hits.into_iter().map(SearchHit::into_metadata).collect())
    }
}

/// Natural-language query sent to the index
pub fn build_query(selection: &Selection) -> String {
    let mut query = format!(
        "{CREATOR_NAME}-style video, type: {}",
        selection.category
    );
    if let Some(companionship) = selection.companionship {
        query.push_str(", mates: ");
        query.push_str(companionship.query_label());
    }
    query
}

/// Fetch the top reference examples for a selection.
///
/// Every failure cause (transport, auth, empty result) collapses into
/// [`IdeaError::Retrieval`]; callers only decide whether to fail over.
#[instrument(skip(store), fields(category = %selection.category))]
pub async fn fetch_remote_examples(
    store: &dyn ExampleStore,
    selection: &Selection,
) -> Result<ExampleSet> {
    let query = build_query(selection);
    debug!(query = %query, "Querying example store");

    let hits = match store.search(&query, EXAMPLE_COUNT).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!(error = %e, "Example store query failed");
            return Err(match e {
                IdeaError::Retrieval(_) => e,
                other => IdeaError::Retrieval(other.to_string()),
            });
        }
    };

    if hits.is_empty() {
        return Err(IdeaError::Retrieval(format!("no matches for '{query}'")));
    }

    let records: Vec<ExampleRecord> = hits
        .iter()
        .take(EXAMPLE_COUNT)
        .map(ExampleRecord::from_metadata)
        .collect();
    debug!(count = records.len(), "Example store returned records");

    Ok(ExampleSet::remote(records))
}
