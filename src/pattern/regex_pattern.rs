use regex::{Regex, RegexBuilder};
use regex_syntax::ast;

use crate::error::PatternError;
use crate::types::{Match, Value};

use super::PatternMatcher;

/// Regular-expression search over the rendered value.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    search: Regex,
    whole: Regex,
}

impl RegexMatcher {
    pub fn new(expression: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        let build = |source: &str| {
            RegexBuilder::new(source)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| syntax_error(expression, e))
        };
        Ok(Self {
            search: build(expression)?,
            whole: build(&format!(r"\A(?:{expression})\z"))?,
        })
    }
}

/// Locates the offending character with the syntax parser when it can.
fn syntax_error(expression: &str, err: regex::Error) -> PatternError {
    match ast::parse::Parser::new().parse(expression) {
        Err(e) => {
            let byte = e.span().start.offset.min(expression.len());
            let offset = expression
                .char_indices()
                .take_while(|(i, _)| *i < byte)
                .count();
            PatternError::at(offset, err.to_string())
        }
        Ok(_) => PatternError::new(err.to_string()),
    }
}

impl PatternMatcher for RegexMatcher {
    fn matches(&self, value: &Value) -> bool {
        self.whole.is_match(&value.to_string())
    }

    fn find(&self, value: &Value) -> Vec<Match> {
        let text = value.to_string();
        self.search
            .find_iter(&text)
            .map(|m| Match {
                start: m.start(),
                end: m.end(),
                value: Value::Text(m.as_str().to_string()),
            })
            .collect()
    }
}
