use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::filters::{ParticipantFilterConfig, PositionFlags, SyllableFilterConfig};
use crate::pattern::{Dialect, PatternSpec};
use crate::pcc::PccOptions;
use crate::types::{SearchBy, TierName};

/// A tier name plus the pattern its value must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierFilterConfig {
    pub enabled: bool,
    pub tier: String,
    pub pattern: PatternSpec,
}

impl Default for TierFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tier: String::new(),
            pattern: PatternSpec::default(),
        }
    }
}

/// Query parameters. Call [`QueryConfig::resolve`] before building a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub search_tier: TierName,
    pub search_by: SearchBy,
    /// When searching by syllable, take syllables per word rather than per group.
    pub syllables_in_words: bool,
    pub primary: PatternSpec,
    /// Add the phones aligned to each IPA match as a result value.
    pub include_aligned: bool,
    pub target_result_filter: PatternSpec,
    pub actual_result_filter: PatternSpec,
    /// Pattern the whole search tier value of a group must satisfy.
    pub tier_filter: PatternSpec,
    pub aligned_group: TierFilterConfig,
    pub groups: PositionFlags,
    pub words: PositionFlags,
    /// Pattern the search tier value of a word must satisfy.
    pub word_pattern: PatternSpec,
    pub aligned_word: TierFilterConfig,
    pub syllables: SyllableFilterConfig,
    pub participant: ParticipantFilterConfig,
    /// Comma separated tiers copied per group.
    pub group_tiers: String,
    /// Comma separated tiers copied per word.
    pub word_tiers: String,
    pub pcc: PccOptions,
    pub threads: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_tier: TierName::IpaTarget,
            search_by: SearchBy::Group,
            syllables_in_words: true,
            primary: PatternSpec::new("", Dialect::Phonex),
            include_aligned: true,
            target_result_filter: PatternSpec::new("", Dialect::Phonex),
            actual_result_filter: PatternSpec::new("", Dialect::Phonex),
            tier_filter: PatternSpec::default(),
            aligned_group: TierFilterConfig::default(),
            groups: PositionFlags::default(),
            words: PositionFlags::default(),
            word_pattern: PatternSpec::default(),
            aligned_word: TierFilterConfig::default(),
            syllables: SyllableFilterConfig::default(),
            participant: ParticipantFilterConfig::default(),
            group_tiers: String::new(),
            word_tiers: String::new(),
            pcc: PccOptions::default(),
            threads: None,
        }
    }
}

impl QueryConfig {
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let data = std::fs::read_to_string(path).map_err(|e| QueryError::io("read query config", e))?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, QueryError> {
        serde_json::from_str(data).map_err(|e| QueryError::json("parse query config", e))
    }

    /// Whether words are enumerated for this query.
    pub fn searches_words(&self) -> bool {
        match self.search_by {
            SearchBy::Group => false,
            SearchBy::Word => true,
            SearchBy::Syllable => self.syllables_in_words,
        }
    }

    /// Apply parameter dependencies once, before a run.
    pub fn resolve(mut self) -> Self {
        if self.search_by == SearchBy::Syllable && !self.search_tier.is_ipa() {
            tracing::debug!(tier = %self.search_tier, "syllable search needs an IPA tier; searching by word");
            self.search_by = SearchBy::Word;
        }
        if !self.searches_words() {
            if !self.word_pattern.expression.is_empty() || !self.word_tiers.trim().is_empty() {
                tracing::debug!("word options ignored without word search");
            }
            self.aligned_word.enabled = false;
            self.word_pattern.expression.clear();
            self.word_tiers.clear();
        }
        for filter in [&mut self.aligned_group, &mut self.aligned_word] {
            if filter.tier.trim().is_empty() {
                filter.enabled = false;
            }
        }
        for spec in [
            &mut self.primary,
            &mut self.target_result_filter,
            &mut self.actual_result_filter,
            &mut self.tier_filter,
            &mut self.word_pattern,
            &mut self.aligned_group.pattern,
            &mut self.aligned_word.pattern,
        ] {
            if !spec.dialect.supports_case_sensitivity() {
                spec.case_sensitive = false;
            }
        }
        self
    }

    /// One-line description used in report metadata.
    pub fn describe(&self) -> String {
        let by = match self.search_by {
            SearchBy::Group => "group",
            SearchBy::Word => "word",
            SearchBy::Syllable => "syllable",
        };
        format!(
            "{} {} '{}' by {by}",
            self.search_tier, self.primary.dialect, self.primary.expression
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_search_target_with_phonex() {
        let config = QueryConfig::default();
        assert_eq!(config.search_tier, TierName::IpaTarget);
        assert_eq!(config.primary.dialect, Dialect::Phonex);
        assert!(config.include_aligned);
        assert!(config.pcc.ignore_diacritics);
    }

    #[test]
    fn parses_partial_json() {
        let config = QueryConfig::from_json_str(
            r#"{
                "search_tier": "IPA Actual",
                "search_by": "word",
                "primary": {"expression": "\\c", "dialect": "phonex"},
                "words": {"medial": false},
                "pcc": {"include_pcc": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.search_tier, TierName::IpaActual);
        assert_eq!(config.search_by, SearchBy::Word);
        assert!(!config.words.medial && config.words.initial);
        assert!(config.pcc.include_pcc && config.pcc.ignore_diacritics);
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = QueryConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, QueryError::Json { .. }));
        assert!(QueryConfig::load(Path::new("/nonexistent/query.json")).is_err());
    }

    #[test]
    fn resolve_disables_word_options_without_word_search() {
        let config = QueryConfig {
            word_pattern: PatternSpec::new("a", Dialect::Plain),
            word_tiers: "Orthography".into(),
            aligned_word: TierFilterConfig {
                tier: "Orthography".into(),
                ..TierFilterConfig::default()
            },
            ..QueryConfig::default()
        }
        .resolve();
        assert!(!config.aligned_word.enabled);
        assert!(config.word_pattern.expression.is_empty());
        assert!(config.word_tiers.is_empty());
        assert!(!config.aligned_group.enabled);
    }

    #[test]
    fn resolve_downgrades_syllable_search_on_text_tier() {
        let config = QueryConfig {
            search_tier: TierName::Orthography,
            search_by: SearchBy::Syllable,
            ..QueryConfig::default()
        }
        .resolve();
        assert_eq!(config.search_by, SearchBy::Word);
    }

    #[test]
    fn resolve_forces_case_folding_for_phonetic_dialects() {
        let config = QueryConfig {
            primary: PatternSpec::new("1", Dialect::Stress).case_sensitive(true),
            tier_filter: PatternSpec::new("Cat", Dialect::Plain).case_sensitive(true),
            ..QueryConfig::default()
        }
        .resolve();
        assert!(!config.primary.case_sensitive);
        assert!(config.tier_filter.case_sensitive);
    }
}
