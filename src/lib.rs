// src/lib.rs
// Silly video idea generator: retrieved examples + LLM completion

pub mod config;
pub mod error;
pub mod idea;
pub mod llm;
pub mod persona;
pub mod prompt;
pub mod retrieval;
pub mod session;

pub use config::{Config, Profile, ProfileKind};
pub use error::{IdeaError, Result};
pub use idea::{Category, Companionship, ParsedIdea, Selection};
pub use session::{IdeaPipeline, RunView, Session};
