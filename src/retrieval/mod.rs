// src/retrieval/mod.rs
// Reference examples: remote vector index first, local catalog as fallback

pub mod catalog;
pub mod vector_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

pub use catalog::FallbackCatalog;
pub use vector_store::{VectorStoreIndex, fetch_remote_examples};

/// How many reference examples go into a prompt
pub const EXAMPLE_COUNT: usize = 3;

/// Placeholder for any field a source does not provide
pub const UNKNOWN_FIELD: &str = "unknown";

/// A prior video concept used as a style reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub title: String,
    pub description: String,
    pub style: String,
    pub payoff: String,
    pub summary: String,
}

impl ExampleRecord {
    /// Extract the five example fields from a metadata mapping.
    ///
    /// Missing or null fields become [`UNKNOWN_FIELD`]; numbers and booleans
    /// are rendered as text.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        Self {
            title: field_text(metadata, "title"),
            description: field_text(metadata, "description"),
            style: field_text(metadata, "style"),
            payoff: field_text(metadata, "payoff"),
            summary: field_text(metadata, "summary"),
        }
    }
}

fn field_text(metadata: &Map<String, Value>, key: &str) -> String {
    match metadata.get(key) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => UNKNOWN_FIELD.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Where an example set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleSource {
    Remote,
    LocalCatalog,
}

/// Ordered examples plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSet {
    pub records: Vec<ExampleRecord>,
    pub source: ExampleSource,
}

impl ExampleSet {
    pub fn remote(records: Vec<ExampleRecord>) -> Self {
        Self {
            records,
            source: ExampleSource::Remote,
        }
    }

    pub fn local(records: Vec<ExampleRecord>) -> Self {
        Self {
            records,
            source: ExampleSource::LocalCatalog,
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.source == ExampleSource::LocalCatalog
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Remote semantic index returning ranked metadata mappings
#[async_trait]
pub trait ExampleStore: Send + Sync {
    /// Return at most `limit` hits for a free-text query, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Map<String, Value>>>;
}
