//! Phonex: sequence patterns over phones.
//!
//! Stress markers and syllable boundaries are skipped while matching;
//! word boundaries are only matched by `\b`.

mod matcher;
mod parser;

pub use parser::{parse, parse_element, ElementMatcher, Node, PhoneMatcher};

use crate::error::PatternError;
use crate::ipa::Transcription;
use crate::types::{Match, Value};

use super::PatternMatcher;

#[derive(Debug, Clone)]
pub struct PhonexPattern {
    expression: String,
    root: Node,
}

impl PhonexPattern {
    pub fn compile(expression: &str) -> Result<Self, PatternError> {
        let root = parse(expression)?;
        Ok(Self {
            expression: expression.to_string(),
            root,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn find_in(&self, transcription: &Transcription) -> Vec<Match> {
        matcher::find(&self.root, transcription)
    }

    pub fn matches_all(&self, transcription: &Transcription) -> bool {
        matcher::full_match(&self.root, transcription)
    }
}

impl PatternMatcher for PhonexPattern {
    fn matches(&self, value: &Value) -> bool {
        value
            .as_transcription()
            .is_some_and(|t| self.matches_all(t))
    }

    fn find(&self, value: &Value) -> Vec<Match> {
        value
            .as_transcription()
            .map(|t| self.find_in(t))
            .unwrap_or_default()
    }
}
