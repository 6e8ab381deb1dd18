// src/llm/client.rs
// Thin OpenAI HTTP client: chat completions and vector store search

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::completion::{ChatBackend, CompletionRequest};
use crate::config::Config;

/// Request timeout; the only time bound a pipeline run has
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_num_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

/// One ranked hit from a vector store search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, alias = "metadata")]
    pub attributes: Option<Map<String, Value>>,
}

impl SearchHit {
    pub fn into_metadata(self) -> Map<String, Value> {
        self.attributes.unwrap_or_default()
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.openai_api_key.clone(), config.api_base.clone())
    }

    /// Universal request builder for all OpenAI JSON endpoints
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(
                method,
                format!(
                    "{}/{}",
                    self.api_base.trim_end_matches('/'),
                    path.trim_start_matches('/')
                ),
            )
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Single-message chat completion; returns the first choice's text
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn chat_completion(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .request(Method::POST, "chat/completions")
            .json(&body)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("OpenAI API error {}: {}", status, error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;
        let text = extract_content(parsed)?;
        debug!(chars = text.len(), "Chat completion received");
        Ok(text)
    }

    /// Semantic search over a vector store, best hits first
    #[instrument(skip(self, query))]
    pub async fn search_vector_store(
        &self,
        store_id: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let response = self
            .request(Method::POST, &format!("vector_stores/{store_id}/search"))
            .json(&SearchRequest {
                query,
                max_num_results: max_results,
            })
            .send()
            .await
            .context("Failed to send vector store search request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("OpenAI API error {}: {}", status, error_text));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse vector store search response")?;
        debug!(hits = parsed.data.len(), "Vector store search complete");
        Ok(parsed.data)
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.chat_completion(request).await
    }
}

fn extract_content(response: ChatResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("No content in chat completion response"))?;

    if text.trim().is_empty() {
        return Err(anyhow!("Empty chat completion"));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_body() {
        let body = ChatRequest {
            model: "gpt-4",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.9,
            max_tokens: 512,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(value["max_tokens"], 512);
        assert!((value["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_extract_first_choice() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Title: One"}},
                {"message": {"role": "assistant", "content": "Title: Two"}}
            ]
        }))
        .unwrap();
        assert_eq!(extract_content(response).unwrap(), "Title: One");
    }

    #[test]
    fn test_missing_or_blank_content_is_error() {
        let no_choices: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(extract_content(no_choices).is_err());

        let null_content: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(extract_content(null_content).is_err());

        let blank: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": "  \n"}}]})).unwrap();
        assert!(extract_content(blank).is_err());
    }

    #[test]
    fn test_search_hit_accepts_metadata_alias() {
        let response: SearchResponse = serde_json::from_value(json!({
            "object": "vector_store.search_results.page",
            "data": [
                {"file_id": "file-1", "score": 0.91, "attributes": {"title": "A"}},
                {"file_id": "file-2", "metadata": {"title": "B"}},
                {"file_id": "file-3", "attributes": null}
            ]
        }))
        .unwrap();

        let maps: Vec<_> = response.data.into_iter().map(SearchHit::into_metadata).collect();
        assert_eq!(maps[0]["title"], "A");
        assert_eq!(maps[1]["title"], "B");
        assert!(maps[2].is_empty());
    }

    #[test]
    fn test_request_url_joins_cleanly() {
        let client = OpenAiClient::new("sk-test", "http://localhost:9999/v1/").unwrap();
        let request = client
            .request(Method::POST, "/chat/completions")
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(
            request.headers()["Authorization"].to_str().unwrap(),
            "Bearer sk-test"
        );
    }
}
