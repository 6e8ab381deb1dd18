// src/idea/mod.rs
// User selection types and the parsed idea handed back to the presentation layer

pub mod parser;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdeaError;

pub use parser::{IdeaParser, LabelParser};

/// What kind of video the user wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Prank,
    /// Bets and social experiments
    Bet,
    Challenge,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prank => "prank",
            Self::Bet => "bet",
            Self::Challenge => "challenge",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = IdeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "prank" => Ok(Self::Prank),
            "bet" | "social-experiment" => Ok(Self::Bet),
            "challenge" => Ok(Self::Challenge),
            other => Err(IdeaError::Config(format!("unknown category '{other}'"))),
        }
    }
}

/// Who the user is doing the video with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Companionship {
    Alone,
    Friends,
    NewFriends,
}

impl Companionship {
    pub const ALL: [Companionship; 3] = [
        Companionship::Alone,
        Companionship::Friends,
        Companionship::NewFriends,
    ];

    /// Label used in retrieval queries, matching how the index was built
    pub fn query_label(&self) -> &'static str {
        match self {
            Self::Alone => "alone",
            Self::Friends => "my friends",
            Self::NewFriends => "make new friends",
        }
    }

    /// Phrase completing "to do it ..."
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Alone => "alone",
            Self::Friends => "with their friends",
            Self::NewFriends => "while making new friends",
        }
    }
}

impl fmt::Display for Companionship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alone => write!(f, "alone"),
            Self::Friends => write!(f, "friends"),
            Self::NewFriends => write!(f, "new-friends"),
        }
    }
}

impl FromStr for Companionship {
    type Err = IdeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "alone" => Ok(Self::Alone),
            "friends" | "my-friends" => Ok(Self::Friends),
            "new-friends" | "make-new-friends" => Ok(Self::NewFriends),
            other => Err(IdeaError::Config(format!("unknown companionship '{other}'"))),
        }
    }
}

/// One request's input, immutable once submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companionship: Option<Companionship>,
}

impl Selection {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            companionship: None,
        }
    }

    pub fn with_companionship(mut self, companionship: Companionship) -> Self {
        self.companionship = Some(companionship);
        self
    }
}

/// Fields extracted from a completion.
///
/// `plan` is `Some` exactly when the active profile asks for an execution
/// plan; unmatched fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIdea {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl ParsedIdea {
    /// Nothing to show: the display layer renders no card
    pub fn is_blank(&self) -> bool {
        self.title.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!("Prank".parse::<Category>().unwrap(), Category::Prank);
        assert_eq!("social experiment".parse::<Category>().unwrap(), Category::Bet);
        assert_eq!("social_experiment".parse::<Category>().unwrap(), Category::Bet);
        assert!("heist".parse::<Category>().is_err());
    }

    #[test]
    fn test_companionship_aliases() {
        assert_eq!("my friends".parse::<Companionship>().unwrap(), Companionship::Friends);
        assert_eq!(
            "make new friends".parse::<Companionship>().unwrap(),
            Companionship::NewFriends
        );
        for c in Companionship::ALL {
            assert_eq!(c.to_string().parse::<Companionship>().unwrap(), c);
        }
    }

    #[test]
    fn test_blank_idea() {
        assert!(ParsedIdea::default().is_blank());
        let idea = ParsedIdea {
            title: "Fake Queue".to_string(),
            ..Default::default()
        };
        assert!(!idea.is_blank());
    }

    #[test]
    fn test_selection_serializes_without_companionship() {
        let json = serde_json::to_value(Selection::new(Category::Challenge)).unwrap();
        assert_eq!(json, serde_json::json!({"category": "challenge"}));
    }
}
