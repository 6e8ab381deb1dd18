// src/persona/mod.rs
// Persona system for the generator's voice.
// Only the default creator persona exists today.

pub mod default;

pub use default::{CREATOR_NAME, DEFAULT_PERSONA_PROMPT};

/// Persona overlays define whose voice the idea is pitched in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persona {
    #[default]
    Default,
}

impl Persona {
    /// Returns the preamble text for this persona.
    pub fn prompt(&self) -> &'static str {
        match self {
            Persona::Default => DEFAULT_PERSONA_PROMPT,
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Persona::Default => "default",
            }
        )
    }
}

impl std::str::FromStr for Persona {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Persona::Default),
            _ => Err(()),
        }
    }
}
