use crate::error::PatternError;
use crate::pattern::{CompiledPattern, Dialect, PatternCompiler, PatternSpec};
use crate::session::TierView;
use crate::types::{Match, TierName, Value};

use super::{Filter, FilterState, ParamInfo};

const DIALECT_NAMES: [&str; 5] = ["Plain text", "Regular expression", "Phonex", "Stress pattern", "CV pattern"];

/// Pattern text compiled once for the chosen dialect.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    id: String,
    spec: PatternSpec,
    compiled: Option<Result<CompiledPattern, PatternError>>,
    state: FilterState,
}

impl PatternFilter {
    pub fn new(id: impl Into<String>, spec: PatternSpec, compiler: &PatternCompiler) -> Self {
        let id = id.into();
        let compiled = (!spec.expression.is_empty()).then(|| compiler.compile(&spec));
        if let Some(Err(err)) = &compiled {
            tracing::warn!(
                filter = id.as_str(),
                dialect = %spec.dialect,
                expression = spec.expression.as_str(),
                error = %err,
                "pattern filter is invalid and will be ignored"
            );
        }
        Self {
            id,
            spec,
            compiled,
            state: FilterState::default(),
        }
    }

    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    pub fn validation_error(&self) -> Option<&PatternError> {
        self.compiled.as_ref().and_then(|c| c.as_ref().err())
    }

    fn pattern(&self) -> Option<&CompiledPattern> {
        self.compiled.as_ref().and_then(|c| c.as_ref().ok())
    }

    /// Exact match when the exact flag is set, otherwise containment.
    pub fn check(&self, value: &Value) -> bool {
        let Some(pattern) = self.pattern() else {
            return false;
        };
        if self.spec.exact {
            pattern.matches(value)
        } else {
            !pattern.find(value).is_empty()
        }
    }

    /// Hits within `value`. With the exact flag a whole-value match yields
    /// one hit spanning the value.
    pub fn find(&self, value: &Value) -> Vec<Match> {
        let Some(pattern) = self.pattern() else {
            return Vec::new();
        };
        if !self.spec.exact {
            return pattern.find(value);
        }
        if !pattern.matches(value) {
            return Vec::new();
        }
        let whole = match self.spec.dialect {
            Dialect::Plain | Dialect::Regex => Value::Text(value.to_string()),
            _ => value.clone(),
        };
        vec![Match {
            start: 0,
            end: whole.extent(),
            value: whole,
        }]
    }

    /// Keep the views whose `tier` value passes [`PatternFilter::check`].
    pub fn filter_views<V: TierView>(&self, views: Vec<V>, tier: &TierName) -> Vec<V> {
        views
            .into_iter()
            .filter(|v| v.tier_value(tier).is_some_and(|value| self.check(&value)))
            .collect()
    }
}

impl Filter for PatternFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        let selected = match self.spec.dialect {
            Dialect::Plain => 0,
            Dialect::Regex => 1,
            Dialect::Phonex => 2,
            Dialect::Stress => 3,
            Dialect::Cv => 4,
        };
        vec![
            ParamInfo::text(format!("{}.filter", self.id), "Expression:", &self.spec.expression),
            ParamInfo::choice(
                format!("{}.filterType", self.id),
                "Expression type:",
                &DIALECT_NAMES,
                selected,
            ),
            ParamInfo::boolean(
                format!("{}.caseSensitive", self.id),
                "Case sensitive",
                self.spec.case_sensitive,
            ),
            ParamInfo::boolean(format!("{}.exactMatch", self.id), "Exact match", self.spec.exact),
        ]
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && self.pattern().is_some()
    }
}
