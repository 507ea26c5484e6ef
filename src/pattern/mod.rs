pub mod phonex;
mod plain;
mod regex_pattern;
pub mod sequence;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::pipeline::defaults::DefaultPhonexCompiler;
use crate::pipeline::traits::PhonexCompiler;
use crate::types::{Match, Value};

pub use phonex::PhonexPattern;
pub use plain::PlainMatcher;
pub use regex_pattern::RegexMatcher;
pub use sequence::{SequenceKind, SequencePattern};

/// Compiled matcher for one dialect.
pub trait PatternMatcher: Send + Sync + fmt::Debug {
    /// Whole-value match.
    fn matches(&self, value: &Value) -> bool;

    /// All hits in the value, in order.
    fn find(&self, value: &Value) -> Vec<Match>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Plain,
    Regex,
    Phonex,
    Stress,
    Cv,
}

impl Dialect {
    /// Only text dialects honour the case-sensitivity flag.
    pub fn supports_case_sensitivity(self) -> bool {
        matches!(self, Self::Plain | Self::Regex)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Regex => "regex",
            Self::Phonex => "phonex",
            Self::Stress => "stress",
            Self::Cv => "cv",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "regex" => Ok(Self::Regex),
            "phonex" => Ok(Self::Phonex),
            "stress" => Ok(Self::Stress),
            "cv" => Ok(Self::Cv),
            other => Err(format!("unknown pattern dialect '{other}'")),
        }
    }
}

/// Pattern text plus the options it is compiled with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSpec {
    pub expression: String,
    pub dialect: Dialect,
    pub case_sensitive: bool,
    /// Whole-value matching instead of substring search.
    pub exact: bool,
}

impl PatternSpec {
    pub fn new(expression: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            expression: expression.into(),
            dialect,
            ..Self::default()
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    dialect: Dialect,
    expression: String,
    matcher: Arc<dyn PatternMatcher>,
}

impl CompiledPattern {
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn matches(&self, value: &Value) -> bool {
        self.matcher.matches(value)
    }

    pub fn find(&self, value: &Value) -> Vec<Match> {
        self.matcher.find(value)
    }
}

/// Compiles pattern text for any dialect. Phonex compilation is delegated
/// to a pluggable [`PhonexCompiler`].
#[derive(Clone)]
pub struct PatternCompiler {
    phonex: Arc<dyn PhonexCompiler>,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(Arc::new(DefaultPhonexCompiler))
    }
}

impl fmt::Debug for PatternCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternCompiler").finish_non_exhaustive()
    }
}

impl PatternCompiler {
    pub fn new(phonex: Arc<dyn PhonexCompiler>) -> Self {
        Self { phonex }
    }

    pub fn compile(&self, spec: &PatternSpec) -> Result<CompiledPattern, PatternError> {
        let expression = spec.expression.as_str();
        if expression.is_empty() {
            return Err(PatternError::new("empty pattern"));
        }
        let case_sensitive = spec.case_sensitive && spec.dialect.supports_case_sensitivity();
        let matcher: Arc<dyn PatternMatcher> = match spec.dialect {
            Dialect::Plain => Arc::new(PlainMatcher::new(expression, case_sensitive)?),
            Dialect::Regex => Arc::new(RegexMatcher::new(expression, case_sensitive)?),
            Dialect::Phonex => self.phonex.compile(expression)?,
            Dialect::Stress => Arc::new(SequencePattern::compile(SequenceKind::Stress, expression)?),
            Dialect::Cv => Arc::new(SequencePattern::compile(SequenceKind::Cv, expression)?),
        };
        Ok(CompiledPattern {
            dialect: spec.dialect,
            expression: expression.to_string(),
            matcher,
        })
    }
}

/// Compile with the builtin phonex engine.
pub fn compile(spec: &PatternSpec) -> Result<CompiledPattern, PatternError> {
    PatternCompiler::default().compile(spec)
}
