use regex::{Regex, RegexBuilder};

use crate::error::PatternError;
use crate::types::{Match, Value};

use super::PatternMatcher;

/// Literal substring search over the rendered value.
#[derive(Debug, Clone)]
pub struct PlainMatcher {
    needle: String,
    folded: Option<Regex>,
}

impl PlainMatcher {
    pub fn new(needle: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        let folded = if case_sensitive {
            None
        } else {
            let regex = RegexBuilder::new(&regex::escape(needle))
                .case_insensitive(true)
                .build()
                .map_err(|e| PatternError::new(e.to_string()))?;
            Some(regex)
        };
        Ok(Self {
            needle: needle.to_string(),
            folded,
        })
    }

    fn find_in(&self, text: &str) -> Vec<Match> {
        if self.needle.is_empty() {
            return Vec::new();
        }
        let hit = |start: usize, end: usize| Match {
            start,
            end,
            value: Value::Text(text[start..end].to_string()),
        };
        match &self.folded {
            Some(regex) => regex.find_iter(text).map(|m| hit(m.start(), m.end())).collect(),
            None => text
                .match_indices(self.needle.as_str())
                .map(|(start, s)| hit(start, start + s.len()))
                .collect(),
        }
    }
}

impl PatternMatcher for PlainMatcher {
    fn matches(&self, value: &Value) -> bool {
        let text = value.to_string();
        match self.folded {
            Some(_) => text.to_lowercase() == self.needle.to_lowercase(),
            None => text == self.needle,
        }
    }

    fn find(&self, value: &Value) -> Vec<Match> {
        self.find_in(&value.to_string())
    }
}
