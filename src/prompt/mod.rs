// src/prompt/mod.rs
// Prompt building module

pub mod builder;

pub use builder::{PromptOptions, build_prompt, describe_selection, format_example};
