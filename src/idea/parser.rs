// src/idea/parser.rs
// Best-effort extraction of labelled sections from free-form model output

use std::sync::LazyLock;

use regex::Regex;

use super::ParsedIdea;

// Markdown around the label itself (`**Title:**`, `## Title:`, `> Title:`) is
// consumed by the pattern; the captured value is left as written.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t>#*_-]*Title\**[ \t]*:\**[ \t]*(.*)$").expect("valid regex")
});
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t>#*_-]*Description\**[ \t]*:\**[ \t]*(.*)$").expect("valid regex")
});
// Final section: captures everything up to the end of the text.
static PLAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t>#*_-]*Execution Plan\**[ \t]*:\**[ \t]*(.*)").expect("valid regex")
});
static LABEL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[>#*_-]*(?:Title|Description|Execution Plan)\**[ \t]*:").expect("valid regex")
});

/// Turns a raw completion into a [`ParsedIdea`].
///
/// Implementations must never fail: a missing or garbled completion yields
/// empty fields, which the display layer treats as "nothing to show".
pub trait IdeaParser: Send + Sync {
    fn parse(&self, raw: Option<&str>) -> ParsedIdea;
}

/// Matches `Title:`, `Description:` and (optionally) `Execution Plan:` labels
/// independently; absence of one never blocks the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelParser {
    pub with_plan: bool,
}

impl LabelParser {
    pub fn new(with_plan: bool) -> Self {
        Self { with_plan }
    }
}

impl IdeaParser for LabelParser {
    fn parse(&self, raw: Option<&str>) -> ParsedIdea {
        let text = raw.unwrap_or_default();
        let plan = self.with_plan.then(|| capture(&PLAN_RE, text));

        ParsedIdea {
            title: capture_line(&TITLE_RE, text),
            description: capture_line(&DESCRIPTION_RE, text),
            plan,
        }
    }
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Single-line field. A label alone on its line takes the next non-empty
/// line, unless that line starts another section.
fn capture_line(re: &Regex, text: &str) -> String {
    let Some(caps) = re.captures(text) else {
        return String::new();
    };
    let value = caps.get(1).map_or("", |m| m.as_str().trim());
    if !value.is_empty() {
        return value.to_string();
    }

    let rest = caps.get(0).map_or("", |m| &text[m.end()..]);
    rest.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| !LABEL_LINE_RE.is_match(line))
        .unwrap_or_default()
        .to_string()
}
