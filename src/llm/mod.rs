// src/llm/mod.rs
// LLM module exports and submodule declarations

pub mod client;
pub mod completion;

pub use client::{OpenAiClient, SearchHit};
pub use completion::{ChatBackend, Completion, CompletionClient, CompletionRequest};
